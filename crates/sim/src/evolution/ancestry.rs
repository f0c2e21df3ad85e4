//! Lineage markers relative to the founder.
//!
//! Depths count generations from the founder (depth 0). The Y line passes
//! only from father to son and the mitochondrial line from mother to any
//! child. Genealogical depths accept either parent: the minimum follows the
//! shortest path back to the founder, the maximum the longest.

use crate::genome::{Lineage, Sex, NO_LINEAGE};

#[inline]
fn next_depth(depth: i32) -> i32 {
    if depth > NO_LINEAGE {
        depth + 1
    } else {
        NO_LINEAGE
    }
}

/// Lineage of a child of `sex` born to the given parents.
pub fn child_lineage(sex: Sex, father: &Lineage, mother: &Lineage) -> Lineage {
    let y_depth = match sex {
        Sex::Male => next_depth(father.y_depth),
        Sex::Female => NO_LINEAGE,
    };
    let mito_depth = next_depth(mother.mito_depth);

    let min_genealogical = [father.min_genealogical, mother.min_genealogical]
        .into_iter()
        .filter(|&d| d > NO_LINEAGE)
        .min()
        .map_or(NO_LINEAGE, |d| d + 1);
    let max_genealogical = next_depth(father.max_genealogical.max(mother.max_genealogical));

    Lineage {
        y_depth,
        mito_depth,
        min_genealogical,
        max_genealogical,
    }
}
