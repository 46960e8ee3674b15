struct RefValues {
    entries: Vec<bool>,
}

impl RefValues {
    fn new(capacity: usize) -> RefValues {
        RefValues {
            entries: vec![false; capacity],
        }
    }

    fn len(&self) -> usize {
        self.entries.iter().filter(|ok| **ok).count()
    }

    fn contains(&self, value: i64) -> bool {
        self.entries[value as usize]
    }

    fn iter(&self) -> std::vec::IntoIter<i64> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(value, ok)| if *ok { Some(value as i64) } else { None })
            .collect::<Vec<i64>>()
            .into_iter()
    }

    fn insert(&mut self, value: i64) -> bool {
        let entry = &mut self.entries[value as usize];
        let ok = !*entry;
        *entry = true;
        ok
    }

    fn remove(&mut self, value: i64) -> Option<i64> {
        let entry = &mut self.entries[value as usize];
        if *entry {
            *entry = false;
            Some(value)
        } else {
            None
        }
    }
}
