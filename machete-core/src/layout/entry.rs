//! Layout entries and pure layout transforms

use std::collections::HashSet;

use serde::Serialize;

use super::format::LayoutFormat;
use crate::error::LayoutError;

/// A branch in the layout together with the branches declared under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEntry {
    /// Branch name, unique within a layout
    pub name: String,
    /// Free text written after the name
    pub annotation: Option<String>,
    /// Child entries in declaration order
    pub children: Vec<LayoutEntry>,
}

impl LayoutEntry {
    /// Create a leaf entry with no annotation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            children: Vec::new(),
        }
    }

    /// Set the annotation
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Set the children
    pub fn with_children(mut self, children: Vec<LayoutEntry>) -> Self {
        self.children = children;
        self
    }
}

/// An ordered forest of layout entries
///
/// Two layouts are equal when their forests are; the indentation format only
/// affects how a layout is printed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BranchLayout {
    roots: Vec<LayoutEntry>,
    #[serde(skip)]
    format: LayoutFormat,
}

impl PartialEq for BranchLayout {
    fn eq(&self, other: &Self) -> bool {
        self.roots == other.roots
    }
}

impl Eq for BranchLayout {}

impl BranchLayout {
    /// Build a layout from root entries, validating names and uniqueness
    pub fn new(roots: Vec<LayoutEntry>) -> Result<Self, LayoutError> {
        let mut seen = HashSet::new();
        validate_entries(&roots, &mut seen)?;
        Ok(Self::from_parts(roots, LayoutFormat::default()))
    }

    pub(crate) fn from_parts(roots: Vec<LayoutEntry>, format: LayoutFormat) -> Self {
        Self { roots, format }
    }

    /// Same forest printed with a different indentation
    pub fn with_format(mut self, format: LayoutFormat) -> Self {
        self.format = format;
        self
    }

    /// Root entries in declaration order
    pub fn roots(&self) -> &[LayoutEntry] {
        &self.roots
    }

    /// Indentation used when printing
    pub fn format(&self) -> LayoutFormat {
        self.format
    }

    /// Whether the layout has no entries
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find an entry anywhere in the forest
    pub fn find(&self, name: &str) -> Option<&LayoutEntry> {
        find_in(&self.roots, name)
    }

    /// Whether an entry with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// The entry `name` is declared under, `None` for roots and unknown names
    pub fn parent_of(&self, name: &str) -> Option<&LayoutEntry> {
        parent_in(&self.roots, name)
    }

    /// All names in pre-order
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_names(&self.roots, &mut names);
        names
    }

    /// Remove `name`, moving its children into its place under its parent
    ///
    /// A root can only be slid out when it has no children.
    pub fn slide_out(&self, name: &str) -> Result<Self, LayoutError> {
        let mut next = self.clone();

        if let Some(pos) = next.roots.iter().position(|e| e.name == name) {
            if !next.roots[pos].children.is_empty() {
                return Err(LayoutError::RootWithChildren(name.to_string()));
            }
            next.roots.remove(pos);
            return Ok(next);
        }

        if slide_out_in(&mut next.roots, name) {
            Ok(next)
        } else {
            Err(LayoutError::UnknownBranch(name.to_string()))
        }
    }

    /// Append a new entry under `parent`, or as the last root when `parent` is `None`
    pub fn add_child(
        &self,
        parent: Option<&str>,
        name: &str,
        annotation: Option<&str>,
    ) -> Result<Self, LayoutError> {
        validate_name(name)?;
        if let Some(annotation) = annotation {
            validate_annotation(name, annotation)?;
        }
        if self.contains(name) {
            return Err(LayoutError::DuplicateBranch(name.to_string()));
        }

        let mut entry = LayoutEntry::new(name);
        entry.annotation = annotation.map(str::to_string);

        let mut next = self.clone();
        match parent {
            None => next.roots.push(entry),
            Some(parent) => {
                let target = find_in_mut(&mut next.roots, parent)
                    .ok_or_else(|| LayoutError::UnknownBranch(parent.to_string()))?;
                target.children.push(entry);
            }
        }
        Ok(next)
    }

    /// Rename an entry, keeping its position, annotation and children
    pub fn rename(&self, from: &str, to: &str) -> Result<Self, LayoutError> {
        validate_name(to)?;
        if from != to && self.contains(to) {
            return Err(LayoutError::DuplicateBranch(to.to_string()));
        }

        let mut next = self.clone();
        let entry = find_in_mut(&mut next.roots, from)
            .ok_or_else(|| LayoutError::UnknownBranch(from.to_string()))?;
        entry.name = to.to_string();
        Ok(next)
    }

    /// Replace or clear the annotation of an entry
    pub fn set_annotation(&self, name: &str, annotation: Option<&str>) -> Result<Self, LayoutError> {
        if let Some(annotation) = annotation {
            validate_annotation(name, annotation)?;
        }

        let mut next = self.clone();
        let entry = find_in_mut(&mut next.roots, name)
            .ok_or_else(|| LayoutError::UnknownBranch(name.to_string()))?;
        entry.annotation = annotation.map(str::to_string);
        Ok(next)
    }
}

fn validate_entries(entries: &[LayoutEntry], seen: &mut HashSet<String>) -> Result<(), LayoutError> {
    for entry in entries {
        validate_name(&entry.name)?;
        if let Some(annotation) = &entry.annotation {
            validate_annotation(&entry.name, annotation)?;
        }
        if !seen.insert(entry.name.clone()) {
            return Err(LayoutError::DuplicateBranch(entry.name.clone()));
        }
        validate_entries(&entry.children, seen)?;
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), LayoutError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(LayoutError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn validate_annotation(name: &str, annotation: &str) -> Result<(), LayoutError> {
    if annotation.contains(['\n', '\r']) {
        return Err(LayoutError::MultilineAnnotation(name.to_string()));
    }
    Ok(())
}

fn find_in<'a>(entries: &'a [LayoutEntry], name: &str) -> Option<&'a LayoutEntry> {
    entries.iter().find_map(|e| {
        if e.name == name {
            Some(e)
        } else {
            find_in(&e.children, name)
        }
    })
}

fn find_in_mut<'a>(entries: &'a mut [LayoutEntry], name: &str) -> Option<&'a mut LayoutEntry> {
    for entry in entries.iter_mut() {
        if entry.name == name {
            return Some(entry);
        }
        if let Some(found) = find_in_mut(&mut entry.children, name) {
            return Some(found);
        }
    }
    None
}

fn parent_in<'a>(entries: &'a [LayoutEntry], name: &str) -> Option<&'a LayoutEntry> {
    entries.iter().find_map(|e| {
        if e.children.iter().any(|c| c.name == name) {
            Some(e)
        } else {
            parent_in(&e.children, name)
        }
    })
}

fn collect_names<'a>(entries: &'a [LayoutEntry], names: &mut Vec<&'a str>) {
    for entry in entries {
        names.push(&entry.name);
        collect_names(&entry.children, names);
    }
}

fn slide_out_in(entries: &mut [LayoutEntry], name: &str) -> bool {
    for entry in entries.iter_mut() {
        if let Some(pos) = entry.children.iter().position(|c| c.name == name) {
            let removed = entry.children.remove(pos);
            let tail = entry.children.split_off(pos);
            entry.children.extend(removed.children);
            entry.children.extend(tail);
            return true;
        }
        if slide_out_in(&mut entry.children, name) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{parse_layout, serialize_layout};

    fn layout(text: &str) -> BranchLayout {
        parse_layout(text).unwrap()
    }

    #[test]
    fn test_slide_out_reparents_children() {
        let before = layout("main\n  develop\n    feature-x\n");
        let after = before.slide_out("develop").unwrap();
        assert_eq!(serialize_layout(&after), "main\n  feature-x\n");
        // the input layout is untouched
        assert!(before.contains("develop"));
    }

    #[test]
    fn test_slide_out_keeps_children_in_place() {
        let before = layout("main\n  a\n  b\n    b1\n    b2\n  c\n");
        let after = before.slide_out("b").unwrap();
        assert_eq!(serialize_layout(&after), "main\n  a\n  b1\n  b2\n  c\n");
    }

    #[test]
    fn test_slide_out_leaf_root() {
        let after = layout("main\n  a\nlonely\n").slide_out("lonely").unwrap();
        assert_eq!(serialize_layout(&after), "main\n  a\n");
    }

    #[test]
    fn test_slide_out_root_with_children_fails() {
        let err = layout("main\n  a\n").slide_out("main").unwrap_err();
        assert_eq!(err, LayoutError::RootWithChildren("main".to_string()));
    }

    #[test]
    fn test_slide_out_unknown_fails() {
        let err = layout("main\n").slide_out("nope").unwrap_err();
        assert_eq!(err, LayoutError::UnknownBranch("nope".to_string()));
    }

    #[test]
    fn test_add_child_appends() {
        let after = layout("main\n  a\n")
            .add_child(Some("main"), "b", Some("wip"))
            .unwrap()
            .add_child(None, "other", None)
            .unwrap();
        assert_eq!(serialize_layout(&after), "main\n  a\n  b wip\nother\n");
    }

    #[test]
    fn test_add_child_validates() {
        let base = layout("main\n  a\n");
        assert_eq!(
            base.add_child(Some("main"), "a", None).unwrap_err(),
            LayoutError::DuplicateBranch("a".to_string())
        );
        assert_eq!(
            base.add_child(Some("ghost"), "b", None).unwrap_err(),
            LayoutError::UnknownBranch("ghost".to_string())
        );
        assert_eq!(
            base.add_child(None, "has space", None).unwrap_err(),
            LayoutError::InvalidName("has space".to_string())
        );
        assert_eq!(
            base.add_child(None, "b", Some("two\nlines")).unwrap_err(),
            LayoutError::MultilineAnnotation("b".to_string())
        );
    }

    #[test]
    fn test_rename() {
        let after = layout("main\n  a note\n    b\n").rename("a", "z").unwrap();
        assert_eq!(serialize_layout(&after), "main\n  z note\n    b\n");

        let err = layout("main\n  a\n").rename("a", "main").unwrap_err();
        assert_eq!(err, LayoutError::DuplicateBranch("main".to_string()));
    }

    #[test]
    fn test_set_annotation() {
        let base = layout("main\n  a old\n");
        let set = base.set_annotation("a", Some("new text")).unwrap();
        assert_eq!(serialize_layout(&set), "main\n  a new text\n");
        let cleared = set.set_annotation("a", None).unwrap();
        assert_eq!(serialize_layout(&cleared), "main\n  a\n");
    }

    #[test]
    fn test_mutations_round_trip_through_text() {
        let forest = layout("main\n  develop\n    feature-x\n")
            .add_child(Some("develop"), "feature-y", Some("needs review"))
            .unwrap()
            .rename("feature-x", "feature-z")
            .unwrap()
            .slide_out("develop")
            .unwrap();
        let reparsed = parse_layout(&serialize_layout(&forest)).unwrap();
        assert_eq!(reparsed, forest);
    }

    #[test]
    fn test_parent_of_and_names() {
        let base = layout("main\n  a\n    b\nside\n");
        assert_eq!(base.parent_of("b").map(|e| e.name.as_str()), Some("a"));
        assert!(base.parent_of("main").is_none());
        assert_eq!(base.names(), vec!["main", "a", "b", "side"]);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let roots = vec![
            LayoutEntry::new("a").with_children(vec![LayoutEntry::new("b")]),
            LayoutEntry::new("b"),
        ];
        assert_eq!(
            BranchLayout::new(roots).unwrap_err(),
            LayoutError::DuplicateBranch("b".to_string())
        );
    }
}
