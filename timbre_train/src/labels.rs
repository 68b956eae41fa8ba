//! Class-id to genre-name mappings, supplied to the trainer and evaluator as
//! configuration.

/// Ordered mapping from integer class id to genre name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The ten GTZAN genres.
    pub fn gtzan() -> Self {
        Self::from_names([
            "blues",
            "classical",
            "country",
            "disco",
            "hiphop",
            "jazz",
            "metal",
            "pop",
            "reggae",
            "rock",
        ])
    }

    /// The five-genre custom set.
    pub fn five_genres() -> Self {
        Self::from_names(["classical", "pop", "rap", "lofi", "metal"])
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn id(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_genre_set_matches_ids() {
        let labels = LabelMap::five_genres();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels.name(0), Some("classical"));
        assert_eq!(labels.name(4), Some("metal"));
        assert_eq!(labels.id("rap"), Some(2));
        assert_eq!(labels.name(5), None);
    }

    #[test]
    fn gtzan_has_ten_classes() {
        let labels = LabelMap::gtzan();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels.id("rock"), Some(9));
    }
}
