/// One run of the transformed string together with the length of the
/// original text that produced it. Lengths are counted in Unicode scalar
/// values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SourceSegment {
    transformed_length: usize,
    original_length: usize,
}

/// Tracks how positions in a transformed string map back to positions in the
/// original string across a chain of length-changing text transformations.
///
/// The map starts out as one 1:1 segment per scalar value; every replacement
/// collapses the covered range into a single segment, so
/// [`TextSourceMap::original_length`] can recover the exact original slice
/// behind any transformed prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSourceMap {
    segments: Vec<SourceSegment>,
}

impl TextSourceMap {
    pub fn new(text: &str) -> Self {
        let segments = text
            .chars()
            .map(|_| SourceSegment {
                transformed_length: 1,
                original_length: 1,
            })
            .collect();
        Self { segments }
    }

    /// Total length of the transformed string, in scalar values.
    pub fn transformed_length(&self) -> usize {
        self.segments.iter().map(|s| s.transformed_length).sum()
    }

    /// Total length of the original string, in scalar values.
    pub fn source_length(&self) -> usize {
        self.segments.iter().map(|s| s.original_length).sum()
    }

    /// Length of the original prefix that produced the first
    /// `transformed_prefix_length` scalars of the transformed string.
    ///
    /// A prefix that splits a multi-scalar segment is attributed the whole
    /// segment; a partial replacement output cannot be traced to a partial
    /// source.
    pub fn original_length(&self, transformed_prefix_length: usize) -> usize {
        let mut remaining = transformed_prefix_length;
        let mut length = 0;
        for segment in &self.segments {
            if remaining == 0 {
                break;
            }
            length += segment.original_length;
            remaining = remaining.saturating_sub(segment.transformed_length);
        }
        length
    }

    /// Records that the transformed range `[start, start + length)` was
    /// replaced by `replacement_length` scalars.
    pub fn replace(&mut self, start: usize, length: usize, replacement_length: usize) {
        let first = self.split_at(start);
        let last = self.split_at(start + length);
        let original_length: usize = self.segments[first..last]
            .iter()
            .map(|s| s.original_length)
            .sum();
        if replacement_length == 0 {
            // Deletions attach their source to the preceding segment so the
            // consumed text stays reachable from earlier prefixes.
            self.segments.drain(first..last);
            if original_length > 0 {
                match first.checked_sub(1).and_then(|i| self.segments.get_mut(i)) {
                    Some(prev) => prev.original_length += original_length,
                    None => self.segments.insert(
                        0,
                        SourceSegment {
                            transformed_length: 0,
                            original_length,
                        },
                    ),
                }
            }
            return;
        }
        self.segments.splice(
            first..last,
            std::iter::once(SourceSegment {
                transformed_length: replacement_length,
                original_length,
            }),
        );
    }

    /// Ensures a segment boundary exists at transformed position `pos` and
    /// returns the index of the segment starting there. When a boundary falls
    /// inside a segment the original length stays with the left fragment.
    fn split_at(&mut self, pos: usize) -> usize {
        let mut offset = 0;
        for (i, segment) in self.segments.iter_mut().enumerate() {
            if offset == pos {
                return i;
            }
            let end = offset + segment.transformed_length;
            if pos < end {
                let right = SourceSegment {
                    transformed_length: end - pos,
                    original_length: 0,
                };
                segment.transformed_length = pos - offset;
                self.segments.insert(i + 1, right);
                return i + 1;
            }
            offset = end;
        }
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity_map_round_trips() {
        let map = TextSourceMap::new("すっごーい");
        assert_eq!(map.transformed_length(), 5);
        assert_eq!(map.original_length(map.transformed_length()), 5);
        assert_eq!(map.original_length(2), 2);
    }

    #[test]
    fn collapse_tracks_original_slice() {
        // "すっっごーーい" -> "すっごーい": two 2:1 collapses
        let mut map = TextSourceMap::new("すっっごーーい");
        map.replace(1, 2, 1);
        map.replace(3, 2, 1);
        assert_eq!(map.transformed_length(), 5);
        assert_eq!(map.source_length(), 7);
        // prefix "すっご" of the transformed text came from "すっっご"
        assert_eq!(map.original_length(3), 4);
        assert_eq!(map.original_length(map.transformed_length()), 7);
    }

    #[test]
    fn expansion_attributes_source_to_the_whole_run() {
        // one char replaced by three
        let mut map = TextSourceMap::new("abc");
        map.replace(1, 1, 3);
        assert_eq!(map.transformed_length(), 5);
        assert_eq!(map.original_length(2), 2);
        assert_eq!(map.original_length(4), 2);
        assert_eq!(map.original_length(5), 3);
    }

    #[test]
    fn deletion_keeps_source_reachable() {
        let mut map = TextSourceMap::new("abcd");
        map.replace(1, 2, 0);
        assert_eq!(map.transformed_length(), 2);
        assert_eq!(map.source_length(), 4);
        assert_eq!(map.original_length(1), 3);
        assert_eq!(map.original_length(2), 4);
    }
}
