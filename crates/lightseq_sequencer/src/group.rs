// SPDX-License-Identifier: MIT OR Apache-2.0
//! Light groups addressed by commands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a light in the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightId(pub usize);

/// Index of a group in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct GroupId(pub usize);

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "light {}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.0)
    }
}

/// A named, ordered set of lights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group name
    pub name: String,
    /// Member lights, in order
    pub lights: Vec<LightId>,
}

impl Group {
    /// Create a group
    pub fn new(name: impl Into<String>, lights: impl IntoIterator<Item = LightId>) -> Self {
        let mut members: Vec<LightId> = Vec::new();
        for light in lights {
            if !members.contains(&light) {
                members.push(light);
            }
        }
        Self {
            name: name.into(),
            lights: members,
        }
    }
}

/// Ordered registry of groups; commands refer to entries by index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupRegistry {
    groups: Vec<Group>,
}

impl GroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding one single-light group per light, so that group `i`
    /// addresses light `i` alone
    pub fn with_single_light_groups(light_count: usize) -> Self {
        let groups = (0..light_count)
            .map(|i| Group::new(format!("Light {i}"), [LightId(i)]))
            .collect();
        Self { groups }
    }

    /// Append a group and return its index
    pub fn add_group(&mut self, group: Group) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(group);
        id
    }

    /// Get a group
    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    /// Whether `id` names an entry in this registry
    pub fn contains(&self, id: GroupId) -> bool {
        id.0 < self.groups.len()
    }

    /// Rename a group
    pub fn rename(&mut self, id: GroupId, name: impl Into<String>) -> bool {
        match self.groups.get_mut(id.0) {
            Some(group) => {
                group.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Iterate groups with their indices
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups.iter().enumerate().map(|(i, g)| (GroupId(i), g))
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// First light reference that falls outside `light_count`, if any
    pub fn find_out_of_range(&self, light_count: usize) -> Option<(GroupId, LightId)> {
        self.iter().find_map(|(id, group)| {
            group
                .lights
                .iter()
                .find(|light| light.0 >= light_count)
                .map(|light| (id, *light))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_light_groups() {
        let registry = GroupRegistry::with_single_light_groups(3);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(GroupId(2)).unwrap().lights, vec![LightId(2)]);
        assert!(registry.get(GroupId(3)).is_none());
    }

    #[test]
    fn test_add_group_returns_index() {
        let mut registry = GroupRegistry::with_single_light_groups(4);
        let id = registry.add_group(Group::new("Left", [LightId(0), LightId(1), LightId(0)]));
        assert_eq!(id, GroupId(4));
        // Duplicate members are collapsed, order kept
        assert_eq!(registry.get(id).unwrap().lights, vec![LightId(0), LightId(1)]);
        assert!(registry.rename(id, "Left side"));
        assert_eq!(registry.get(id).unwrap().name, "Left side");
    }

    #[test]
    fn test_out_of_range_lights() {
        let mut registry = GroupRegistry::with_single_light_groups(2);
        assert_eq!(registry.find_out_of_range(2), None);
        registry.add_group(Group::new("Too far", [LightId(1), LightId(5)]));
        assert_eq!(registry.find_out_of_range(2), Some((GroupId(2), LightId(5))));
    }
}
