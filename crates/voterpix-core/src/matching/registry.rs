//! Document-wide registry of output file names.

use std::collections::HashSet;

/// Tracks the names used in one document's output directory so a name
/// assigned on an earlier page is never overwritten by a later page.
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `filename` for `page`, rewriting it if already taken.
    ///
    /// A taken name becomes `<stem>_page<N>.<ext>`, then
    /// `<stem>_page<N>_<k>.<ext>` for k = 2, 3, ...
    pub fn claim(&mut self, page: u32, filename: &str) -> String {
        if self.used.insert(filename.to_string()) {
            return filename.to_string();
        }

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{}", ext)),
            None => (filename, String::new()),
        };

        let candidate = format!("{}_page{}{}", stem, page, ext);
        if self.used.insert(candidate.clone()) {
            return candidate;
        }

        let mut k = 2;
        loop {
            let candidate = format!("{}_page{}_{}{}", stem, page, k, ext);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            k += 1;
        }
    }

    /// Number of names reserved so far.
    pub fn reserved(&self) -> usize {
        self.used.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_claim_unchanged() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.claim(2, "12345678.jpg"), "12345678.jpg");
        assert_eq!(registry.claim(2, "87654321.jpg"), "87654321.jpg");
        assert_eq!(registry.reserved(), 2);
    }

    #[test]
    fn test_collisions_rewritten() {
        let mut registry = NameRegistry::new();
        registry.claim(2, "12345678.jpg");
        assert_eq!(registry.claim(5, "12345678.jpg"), "12345678_page5.jpg");
        assert_eq!(registry.claim(5, "12345678.jpg"), "12345678_page5_2.jpg");
        assert_eq!(registry.claim(5, "12345678.jpg"), "12345678_page5_3.jpg");
        assert_eq!(registry.reserved(), 4);
    }

    #[test]
    fn test_name_without_extension() {
        let mut registry = NameRegistry::new();
        registry.claim(1, "cover");
        assert_eq!(registry.claim(3, "cover"), "cover_page3");
    }
}
