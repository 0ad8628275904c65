use crate::error::MapError;

/// Width of one block on disk, one `i32` word.
pub(crate) const BLOCK_SIZE: usize = std::mem::size_of::<i32>();

pub(crate) type UnitIndex = u64;
pub(crate) type PartialSum = i64;
pub(crate) type Cutoff = u64;

/// Half-open span `[start, end)` of block indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct UnitRange {
    start: UnitIndex,
    end: UnitIndex,
}

impl UnitRange {
    pub(crate) fn new(start: UnitIndex, end: UnitIndex) -> Result<Self, MapError> {
        if start > end {
            return Err(MapError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub(crate) fn len(&self) -> u64 {
        self.end - self.start
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Splits at the midpoint. The right half gets the extra unit of an odd
    /// span: `[start, mid)` and `[mid, end)` with `mid = start + len / 2`.
    pub(crate) fn split(&self) -> (UnitRange, UnitRange) {
        let mid = self.start + self.len() / 2;
        (
            UnitRange {
                start: self.start,
                end: mid,
            },
            UnitRange {
                start: mid,
                end: self.end,
            },
        )
    }

    pub(crate) fn units(&self) -> std::ops::Range<UnitIndex> {
        self.start..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            UnitRange::new(5, 4),
            Err(MapError::InvalidRange { start: 5, end: 4 })
        ));
    }

    #[test]
    fn split_is_contiguous() {
        let range = UnitRange::new(3, 10).unwrap();
        let (left, right) = range.split();
        assert_eq!(left, UnitRange::new(3, 6).unwrap());
        assert_eq!(right, UnitRange::new(6, 10).unwrap());
        assert_eq!(left.len() + right.len(), range.len());
    }

    #[test]
    fn single_unit_split_leaves_one_side_empty() {
        let (left, right) = UnitRange::new(8, 9).unwrap().split();
        assert!(left.is_empty());
        assert_eq!(right.len(), 1);
    }
}
