//! Content-model matching.
//!
//! Children are matched against an [`OrderIndicator`] by tracking the set
//! of positions reachable after each particle. Strict matching honours
//! `minOccurs`; partial matching treats every minimum as zero, which
//! answers "is this an ordered subset of some valid child list".

use std::collections::BTreeSet;

use crate::model::{Compositor, ElementDef, MaxOccurs, OrderIndicator, Particle};

impl OrderIndicator {
    /// Does `tags` satisfy this content model exactly?
    pub fn accepts(&self, tags: &[&str]) -> bool {
        self.match_from(tags, 0, false).contains(&tags.len())
    }

    /// Can `tags` be completed into a valid child list by adding elements?
    pub fn accepts_partial(&self, tags: &[&str]) -> bool {
        self.match_from(tags, 0, true).contains(&tags.len())
    }

    /// Index at which `tag` may be inserted among `tags`.
    ///
    /// Appending is tried first and then every earlier position from the
    /// back, so repeated tags land after their last sibling.
    pub fn insertion_index(&self, tags: &[&str], tag: &str) -> Option<usize> {
        self.element(tag)?;
        let mut candidate = tags.to_vec();
        candidate.push(tag);
        if self.accepts_partial(&candidate) {
            return Some(tags.len());
        }
        // Move the new tag one step towards the front each round.
        for index in (0..tags.len()).rev() {
            candidate.swap(index, index + 1);
            if self.accepts_partial(&candidate) {
                return Some(index);
            }
        }
        None
    }

    /// Declaration for `tag` anywhere in this model.
    pub fn element(&self, tag: &str) -> Option<&ElementDef> {
        self.particles.iter().find_map(|particle| match particle {
            Particle::Element(def) if def.tag == tag => Some(def),
            Particle::Element(_) => None,
            Particle::Indicator(nested) => nested.element(tag),
        })
    }

    /// All element declarations in document order.
    pub fn elements(&self) -> Vec<&ElementDef> {
        let mut out = Vec::new();
        for particle in &self.particles {
            match particle {
                Particle::Element(def) => out.push(def),
                Particle::Indicator(nested) => out.extend(nested.elements()),
            }
        }
        out
    }

    /// Mandatory children and their minimum counts. A choice contributes
    /// its first alternative; counts scale with the indicator's minimum.
    pub fn required_children(&self) -> Vec<(String, u32)> {
        if self.min_occurs == 0 {
            return Vec::new();
        }
        let particles: &[Particle] = match self.compositor {
            Compositor::Sequence => &self.particles,
            Compositor::Choice => match self.particles.first() {
                Some(first) => std::slice::from_ref(first),
                None => &[],
            },
        };

        let mut required = Vec::new();
        for particle in particles {
            match particle {
                Particle::Element(def) if def.min_occurs > 0 => {
                    required.push((def.tag.clone(), def.min_occurs))
                }
                Particle::Element(_) => {}
                Particle::Indicator(nested) => required.extend(nested.required_children()),
            }
        }
        for (_, count) in required.iter_mut() {
            *count *= self.min_occurs;
        }
        required
    }

    /// Position in the flattened declaration list, used to sort children.
    pub fn slot_of(&self, tag: &str) -> Option<usize> {
        self.elements().iter().position(|def| def.tag == tag)
    }

    fn match_from(&self, tags: &[&str], start: usize, partial: bool) -> BTreeSet<usize> {
        let min = if partial { 0 } else { self.min_occurs };
        let mut ends = BTreeSet::new();
        if min == 0 {
            ends.insert(start);
        }

        let mut frontier = BTreeSet::from([start]);
        let mut seen = BTreeSet::new();
        let mut round: u32 = 0;
        while !frontier.is_empty() && self.max_occurs.allows(round as usize + 1) {
            round += 1;
            let mut next = BTreeSet::new();
            for &pos in &frontier {
                next.extend(self.match_once(tags, pos, partial));
            }
            if round >= min {
                next.retain(|pos| seen.insert(*pos));
                ends.extend(next.iter().copied());
            }
            frontier = next;
        }
        ends
    }

    fn match_once(&self, tags: &[&str], start: usize, partial: bool) -> BTreeSet<usize> {
        match self.compositor {
            Compositor::Sequence => {
                let mut positions = BTreeSet::from([start]);
                for particle in &self.particles {
                    let mut next = BTreeSet::new();
                    for &pos in &positions {
                        next.extend(match_particle(particle, tags, pos, partial));
                    }
                    positions = next;
                    if positions.is_empty() {
                        break;
                    }
                }
                positions
            }
            Compositor::Choice => self
                .particles
                .iter()
                .flat_map(|particle| match_particle(particle, tags, start, partial))
                .collect(),
        }
    }
}

fn match_particle(particle: &Particle, tags: &[&str], start: usize, partial: bool) -> BTreeSet<usize> {
    match particle {
        Particle::Element(def) => {
            let min = if partial { 0 } else { def.min_occurs as usize };
            let max = match def.max_occurs {
                MaxOccurs::Bounded(n) => n as usize,
                MaxOccurs::Unbounded => usize::MAX,
            };
            let run = tags[start..]
                .iter()
                .take(max)
                .take_while(|t| **t == def.tag)
                .count();
            (min..=run).map(|count| start + count).collect()
        }
        Particle::Indicator(nested) => nested.match_from(tags, start, partial),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin_like() -> OrderIndicator {
        OrderIndicator::sequence(vec![
            ElementDef::new("description", "text").into(),
            ElementDef::new("image", "image").optional().into(),
            ElementDef::new("files", "files").optional().into(),
            ElementDef::new("typeDescriptor", "type").into(),
        ])
    }

    fn dependencies_like() -> OrderIndicator {
        OrderIndicator::choice(vec![
            ElementDef::new("fileDependency", "file").into(),
            ElementDef::new("flagDependency", "flag").into(),
            ElementDef::new("dependencies", "nested").into(),
        ])
        .with_occurs(1, MaxOccurs::Unbounded)
    }

    #[test]
    fn test_sequence_accepts_in_order_only() {
        let model = plugin_like();
        assert!(model.accepts(&["description", "typeDescriptor"]));
        assert!(model.accepts(&["description", "image", "files", "typeDescriptor"]));
        assert!(!model.accepts(&["typeDescriptor", "description"]));
        assert!(!model.accepts(&["description"]));
        assert!(!model.accepts(&["description", "image", "image", "typeDescriptor"]));
    }

    #[test]
    fn test_partial_ignores_minimums() {
        let model = plugin_like();
        assert!(model.accepts_partial(&[]));
        assert!(model.accepts_partial(&["image"]));
        assert!(!model.accepts_partial(&["image", "description"]));
    }

    #[test]
    fn test_insertion_index_follows_declared_order() {
        let model = plugin_like();
        let tags = ["description", "typeDescriptor"];
        assert_eq!(model.insertion_index(&tags, "files"), Some(1));
        assert_eq!(model.insertion_index(&tags, "image"), Some(1));
        assert_eq!(model.insertion_index(&tags, "description"), None);
        assert_eq!(model.insertion_index(&tags, "unknown"), None);
    }

    #[test]
    fn test_repeatable_choice_appends() {
        let model = dependencies_like();
        let tags = ["fileDependency", "flagDependency"];
        assert_eq!(model.insertion_index(&tags, "fileDependency"), Some(2));
        assert!(model.accepts(&["flagDependency", "fileDependency", "flagDependency"]));
        assert!(!model.accepts(&[]));
    }

    #[test]
    fn test_repeated_element_lands_after_last_instance() {
        let model = OrderIndicator::sequence(vec![
            ElementDef::new("visible", "deps").optional().into(),
            ElementDef::new("group", "group").repeated().into(),
            ElementDef::new("footer", "text").optional().into(),
        ]);
        let tags = ["group", "group", "footer"];
        assert_eq!(model.insertion_index(&tags, "group"), Some(2));
        assert_eq!(model.insertion_index(&tags, "visible"), Some(0));
    }

    #[test]
    fn test_long_repeated_choice() {
        let files = OrderIndicator::choice(vec![
            ElementDef::new("file", "fileType").into(),
            ElementDef::new("folder", "fileType").into(),
        ])
        .with_occurs(0, MaxOccurs::Unbounded);
        let tags: Vec<&str> = (0..20_000)
            .map(|i| if i % 7 == 0 { "folder" } else { "file" })
            .collect();

        assert!(files.accepts(&tags));
        assert_eq!(files.insertion_index(&tags, "file"), Some(tags.len()));
        assert_eq!(files.insertion_index(&tags, "folder"), Some(tags.len()));
    }

    #[test]
    fn test_insertion_before_long_run() {
        let model = OrderIndicator::sequence(vec![
            ElementDef::new("header", "text").optional().into(),
            ElementDef::new("item", "item").repeated().into(),
        ]);
        let tags = vec!["item"; 300];
        assert_eq!(model.insertion_index(&tags, "header"), Some(0));
        assert_eq!(model.insertion_index(&tags, "item"), Some(300));
    }

    #[test]
    fn test_required_children_takes_first_choice() {
        let typed = OrderIndicator::choice(vec![
            ElementDef::new("type", "pluginType").into(),
            ElementDef::new("dependencyType", "dependencyType").into(),
        ]);
        assert_eq!(typed.required_children(), vec![("type".to_string(), 1)]);

        let plugin = plugin_like();
        assert_eq!(
            plugin.required_children(),
            vec![("description".to_string(), 1), ("typeDescriptor".to_string(), 1)]
        );
    }

    #[test]
    fn test_required_children_scale_with_indicator_minimum() {
        let nested = OrderIndicator::sequence(vec![ElementDef::new("pair", "pair").into()])
            .with_occurs(2, MaxOccurs::Bounded(3));
        let outer = OrderIndicator::sequence(vec![nested.into()]);
        assert_eq!(outer.required_children(), vec![("pair".to_string(), 2)]);
        assert!(outer.accepts(&["pair", "pair"]));
        assert!(!outer.accepts(&["pair"]));
        assert!(!outer.accepts(&["pair", "pair", "pair", "pair"]));
    }

    #[test]
    fn test_empty_model_accepts_nothing_but_empty() {
        let model = OrderIndicator::empty();
        assert!(model.accepts(&[]));
        assert!(!model.accepts(&["anything"]));
    }
}
