use log::info;

#[allow(unused_imports)]
use crate::RbTree;

/// Depth calculates minimum, maximum, average and percentile of NIL-leaf
/// depths in the [`RbTree`] tree. A NIL leaf hanging off the root is at
/// depth 1, so [`Depth::max`] is the height of the tree.
#[derive(Clone, Debug)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    depths: [u64; 256],
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        if self.samples == 0 || depth < self.min {
            self.min = depth
        }
        if depth > self.max {
            self.max = depth
        }
        self.samples += 1;
        self.total += depth;
        self.depths[depth] += 1;
    }

    /// Return number of NIL leaves sampled in [`RbTree`] instance.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return minimum depth of NIL leaf in [`RbTree`] instance.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return maximum depth of NIL leaf in [`RbTree`] instance.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Return the average depth of NIL leaves in [`RbTree`] instance.
    pub fn mean(&self) -> usize {
        match self.samples {
            0 => 0,
            n => self.total / n,
        }
    }

    /// Return depth as tuple of percentiles, each tuple provides
    /// (percentile, depth). Returned percentiles from 90, 91 .. 100
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut percentiles: Vec<(u8, usize)> = vec![];
        if self.samples == 0 {
            return percentiles;
        }
        let (mut acc, mut prev_perc) = (0_u64, 90_u8);
        let iter = self.depths.iter().enumerate().filter(|(_, &item)| item > 0);
        for (depth, samples) in iter {
            acc += *samples;
            let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
            if perc >= prev_perc {
                percentiles.push((perc, depth));
                prev_perc = perc;
            }
        }
        percentiles
    }

    /// Log depth statistics in human readable format, at info level.
    pub fn pretty_print(&self, prefix: &str) {
        info!(
            "{}depth (min, avg, max): {:?}",
            prefix,
            (self.min, self.mean(), self.max)
        );
        for (perc, depth) in self.percentiles().into_iter() {
            info!("{}  {} percentile = {}", prefix, perc, depth);
        }
    }

    /// Convert depth statistics to JSON format, useful for plotting.
    pub fn json(&self) -> String {
        let ps: Vec<String> = self
            .percentiles()
            .into_iter()
            .map(|(p, d)| format!("\"{}\": {}", p, d))
            .collect();
        let strs = [
            format!("\"min\": {}", self.min),
            format!("\"mean\": {}", self.mean()),
            format!("\"max\": {}", self.max),
            format!("\"percentiles\": {{ {} }}", ps.join(", ")),
        ];
        "{ ".to_string() + strs.join(", ").as_str() + " }"
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            samples: 0,
            min: 0,
            max: 0,
            total: 0,
            depths: [0; 256],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Depth;

    #[test]
    fn test_depth_empty() {
        let depth = Depth::new();
        assert_eq!(depth.samples(), 0);
        assert_eq!(depth.mean(), 0);
        assert!(depth.percentiles().is_empty());
    }

    #[test]
    fn test_depth_sample() {
        let mut depth = Depth::new();
        for d in [3, 2, 4, 3, 3].iter() {
            depth.sample(*d);
        }
        assert_eq!(depth.samples(), 5);
        assert_eq!(depth.min(), 2);
        assert_eq!(depth.max(), 4);
        assert_eq!(depth.mean(), 3);
        assert_eq!(depth.percentiles(), vec![(100, 4)]);
    }

    #[test]
    fn test_depth_json() {
        let mut depth = Depth::new();
        depth.sample(1);
        depth.sample(1);
        let s = depth.json();
        assert!(s.starts_with("{ \"min\": 1, \"mean\": 1, \"max\": 1"));
        assert!(s.contains("\"100\": 1"));
    }
}
