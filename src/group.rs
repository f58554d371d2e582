//! Name-pattern classification of editables into groups.

use crate::config::GroupConfig;
use crate::error::BuildError;
use regex::Regex;

/// Index of a group inside its [`GroupClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    pattern: Regex,
}

impl Group {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, BuildError> {
        let name = name.into();
        let pattern =
            Regex::new(pattern).map_err(|source| BuildError::InvalidGroupPattern { name: name.clone(), source })?;
        Ok(Self { name, pattern })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn test(&self, structural_name: &str) -> bool {
        self.pattern.is_match(structural_name)
    }
}

/// Ordered `(name, pattern)` table. The first matching pattern wins.
#[derive(Debug, Clone, Default)]
pub struct GroupClassifier {
    groups: Vec<Group>,
}

impl GroupClassifier {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn from_config(entries: &[GroupConfig]) -> Result<Self, BuildError> {
        let groups = entries.iter().map(|entry| Group::new(&entry.name, &entry.pattern)).collect::<Result<_, _>>()?;
        Ok(Self { groups })
    }

    pub fn classify(&self, structural_name: &str) -> Option<GroupId> {
        self.groups.iter().position(|group| group.test(structural_name)).map(GroupId)
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn name(&self, id: GroupId) -> Option<&str> {
        self.get(id).map(Group::name)
    }

    /// Group names in table order, without repeats.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            if !names.contains(&group.name()) {
                names.push(group.name());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_groups;

    #[test]
    fn first_match_wins() {
        let classifier = GroupClassifier::new(vec![
            Group::new("Left arm", r"(?i)\bl(eft)?[_ ]?(shoulder|shldr|arm)").unwrap(),
            Group::new("Chest", r"(?i)chest").unwrap(),
        ]);
        let id = classifier.classify("Chest/lShldr").expect("grouped");
        assert_eq!(classifier.name(id), Some("Left arm"));
        let id = classifier.classify("Chest/chest1").expect("grouped");
        assert_eq!(classifier.name(id), Some("Chest"));
        assert_eq!(classifier.classify("hip/pelvis"), None);
    }

    #[test]
    fn duplicate_names_are_listed_once() {
        let classifier = GroupClassifier::new(vec![
            Group::new("Head", "head").unwrap(),
            Group::new("Head", "(?i)jaw").unwrap(),
            Group::new("Chest", "chest").unwrap(),
        ]);
        assert_eq!(classifier.names(), ["Head", "Chest"]);
        let id = classifier.classify("lowerJaw").unwrap();
        assert_eq!(classifier.name(id), Some("Head"));
    }

    #[test]
    fn invalid_pattern_is_reported_with_group_name() {
        let err = Group::new("Broken", "(unclosed").unwrap_err();
        assert!(matches!(err, BuildError::InvalidGroupPattern { ref name, .. } if name == "Broken"));
    }

    #[test]
    fn default_table_sorts_body_parts() {
        let classifier = GroupClassifier::from_config(&default_groups()).expect("default patterns compile");
        let group_of = |path: &str| classifier.classify(path).and_then(|id| classifier.name(id));
        assert_eq!(group_of("head/lowerJaw"), Some("Head"));
        assert_eq!(group_of("lCollar/lShldr/lForeArm"), Some("Left arm"));
        assert_eq!(group_of("rCollar/rShldr"), Some("Right arm"));
        assert_eq!(group_of("hip/pelvis/lThigh/lShin"), Some("Left leg"));
        assert_eq!(group_of("hip/pelvis/rThigh"), Some("Right leg"));
        assert_eq!(group_of("chest/chest1"), Some("Chest"));
        assert_eq!(group_of("hip/abdomen"), Some("Abdomen / Hip"));
    }
}
