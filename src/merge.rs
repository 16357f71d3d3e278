//! Ordered merge of two sorted name listings
//!
//! One linear pass with a cursor per side instead of a quadratic pairwise
//! scan - listings can be large. Both inputs must already be sorted by
//! [`natural_os_cmp`](crate::natural::natural_os_cmp).

use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

use crate::natural::natural_key_cmp;

/// One event from merging two listings: a name present on both sides, or a
/// name present on only one.
///
/// Names are raw `OsString`s so the caller can rebuild real filesystem
/// paths from them; display layers take the lossy view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    Common(OsString),
    LeftOnly(OsString),
    RightOnly(OsString),
}

impl MergeEvent {
    pub fn name(&self) -> &OsStr {
        match self {
            MergeEvent::Common(name)
            | MergeEvent::LeftOnly(name)
            | MergeEvent::RightOnly(name) => name,
        }
    }
}

/// Merge two naturally sorted listings into an ordered event sequence.
///
/// Names are common only when the natural keys compare equal AND the names
/// are byte-for-byte equal; key-equal-but-distinct names ("file1" vs
/// "file01") come out as two one-sided events ordered by the byte tiebreak.
/// Every input name appears in exactly one event.
pub fn merge_names(left: &[OsString], right: &[OsString]) -> Vec<MergeEvent> {
    let mut events = Vec::with_capacity(left.len() + right.len());
    let mut i = 0;
    let mut j = 0;
    while i < left.len() && j < right.len() {
        let (l, r) = (&left[i], &right[j]);
        let key = natural_key_cmp(&l.to_string_lossy(), &r.to_string_lossy());
        if key == Ordering::Equal && l == r {
            events.push(MergeEvent::Common(l.clone()));
            i += 1;
            j += 1;
        } else if key.then_with(|| l.as_bytes().cmp(r.as_bytes())) == Ordering::Less {
            events.push(MergeEvent::LeftOnly(l.clone()));
            i += 1;
        } else {
            events.push(MergeEvent::RightOnly(r.clone()));
            j += 1;
        }
    }
    for l in &left[i..] {
        events.push(MergeEvent::LeftOnly(l.clone()));
    }
    for r in &right[j..] {
        events.push(MergeEvent::RightOnly(r.clone()));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    #[test]
    fn interleaved_listings() {
        let left = names(&["x", "y", "z"]);
        let right = names(&["y", "z", "w"]);
        let events = merge_names(&left, &right);
        assert_eq!(
            events,
            vec![
                MergeEvent::LeftOnly("x".into()),
                MergeEvent::Common("y".into()),
                MergeEvent::Common("z".into()),
                MergeEvent::RightOnly("w".into()),
            ]
        );
    }

    #[test]
    fn event_count_identity() {
        let left = names(&["a", "b", "c", "d"]);
        let right = names(&["b", "d", "e"]);
        let events = merge_names(&left, &right);
        let common = events
            .iter()
            .filter(|e| matches!(e, MergeEvent::Common(_)))
            .count();
        assert_eq!(events.len(), left.len() + right.len() - common);
        assert_eq!(common, 2);
    }

    #[test]
    fn one_side_empty() {
        let left = names(&["a", "b"]);
        let events = merge_names(&left, &[]);
        assert_eq!(
            events,
            vec![
                MergeEvent::LeftOnly("a".into()),
                MergeEvent::LeftOnly("b".into()),
            ]
        );
        assert!(merge_names(&[], &[]).is_empty());
    }

    #[test]
    fn natural_order_decides_one_sided_emission() {
        let left = names(&["file2"]);
        let right = names(&["file10"]);
        let events = merge_names(&left, &right);
        assert_eq!(
            events,
            vec![
                MergeEvent::LeftOnly("file2".into()),
                MergeEvent::RightOnly("file10".into()),
            ]
        );
    }

    #[test]
    fn key_equal_distinct_names_are_one_sided() {
        let left = names(&["file01"]);
        let right = names(&["file1"]);
        let events = merge_names(&left, &right);
        assert_eq!(
            events,
            vec![
                MergeEvent::LeftOnly("file01".into()),
                MergeEvent::RightOnly("file1".into()),
            ]
        );
    }

    #[test]
    fn non_utf8_names_pair_by_bytes() {
        let weird = OsStr::from_bytes(b"caf\xe9").to_os_string();
        let left = vec![weird.clone()];
        let right = vec![weird.clone()];
        let events = merge_names(&left, &right);
        assert_eq!(events, vec![MergeEvent::Common(weird)]);
    }

    #[test]
    fn lossy_equal_but_byte_distinct_names_are_one_sided() {
        let a = OsStr::from_bytes(b"caf\xe9").to_os_string();
        let b = OsStr::from_bytes(b"caf\xea").to_os_string();
        // Both render as "caf\u{fffd}" but are different files.
        let events = merge_names(&[a.clone()], &[b.clone()]);
        assert_eq!(
            events,
            vec![MergeEvent::LeftOnly(a), MergeEvent::RightOnly(b)]
        );
    }

    #[test]
    fn preserves_each_sides_relative_order() {
        let left = names(&["a1", "a2", "a10"]);
        let right = names(&["a2", "a9", "a10", "a11"]);
        let events = merge_names(&left, &right);
        let lefts: Vec<&OsStr> = events
            .iter()
            .filter(|e| !matches!(e, MergeEvent::RightOnly(_)))
            .map(|e| e.name())
            .collect();
        let rights: Vec<&OsStr> = events
            .iter()
            .filter(|e| !matches!(e, MergeEvent::LeftOnly(_)))
            .map(|e| e.name())
            .collect();
        assert_eq!(lefts, vec!["a1", "a2", "a10"]);
        assert_eq!(rights, vec!["a2", "a9", "a10", "a11"]);
    }
}
