//! Near-equal random partitioning of items across ordered buckets.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::EngineError;

/// An item together with the bucket that currently holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed<T, B> {
    pub item: T,
    pub bucket: B,
}

impl<T, B> Placed<T, B> {
    pub fn new(item: T, bucket: B) -> Self {
        Self { item, bucket }
    }
}

/// Instruction to reassign `item` from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInstruction<T, B> {
    pub item: T,
    pub from: B,
    pub to: B,
}

/// Items assigned to one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketShare<T, B> {
    pub bucket: B,
    pub items: Vec<T>,
}

/// Result of [`distribute`]: shares in bucket order plus the moves needed to realize them.
#[derive(Debug, Clone)]
pub struct Distribution<T, B> {
    shares: Vec<BucketShare<T, B>>,
    moves: Vec<MoveInstruction<T, B>>,
}

impl<T, B: PartialEq> Distribution<T, B> {
    pub fn shares(&self) -> &[BucketShare<T, B>] {
        &self.shares
    }

    pub fn moves(&self) -> &[MoveInstruction<T, B>] {
        &self.moves
    }

    /// Items assigned to `bucket`, or `None` if it was not a target.
    pub fn items_for(&self, bucket: &B) -> Option<&[T]> {
        self.shares
            .iter()
            .find(|share| &share.bucket == bucket)
            .map(|share| share.items.as_slice())
    }

    pub fn count_for(&self, bucket: &B) -> usize {
        self.items_for(bucket).map_or(0, <[T]>::len)
    }

    pub fn total_items(&self) -> usize {
        self.shares.iter().map(|share| share.items.len()).sum()
    }
}

/// Share sizes for `items` spread over `buckets`: `items / buckets` each, with the remainder going
/// one apiece to the earliest buckets.
pub fn partition_sizes(items: usize, buckets: usize) -> Vec<usize> {
    if buckets == 0 {
        return Vec::new();
    }
    let base = items / buckets;
    let remainder = items % buckets;
    (0..buckets)
        .map(|idx| if idx < remainder { base + 1 } else { base })
        .collect()
}

/// Shuffles `items` and deals them across `buckets` in order.
///
/// Every item lands in exactly one bucket. Items whose assigned bucket differs from the one they
/// started in produce a [`MoveInstruction`]; the rest are left alone. Bucket tokens must be
/// unique.
pub fn distribute<T, B, R>(
    mut items: Vec<Placed<T, B>>,
    buckets: &[B],
    rng: &mut R,
) -> Result<Distribution<T, B>, EngineError>
where
    T: Clone,
    B: Clone + PartialEq,
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return Err(EngineError::invalid("no items to distribute"));
    }
    if buckets.is_empty() {
        return Err(EngineError::invalid("no buckets to distribute into"));
    }
    if buckets
        .iter()
        .enumerate()
        .any(|(idx, bucket)| buckets[..idx].contains(bucket))
    {
        return Err(EngineError::invalid("bucket list contains duplicates"));
    }

    items.shuffle(rng);

    let sizes = partition_sizes(items.len(), buckets.len());
    let mut remaining = items.into_iter();
    let mut shares = Vec::with_capacity(buckets.len());
    let mut moves = Vec::new();

    for (bucket, size) in buckets.iter().zip(sizes) {
        let mut share = Vec::with_capacity(size);
        for placed in remaining.by_ref().take(size) {
            if placed.bucket != *bucket {
                moves.push(MoveInstruction {
                    item: placed.item.clone(),
                    from: placed.bucket,
                    to: bucket.clone(),
                });
            }
            share.push(placed.item);
        }
        shares.push(BucketShare {
            bucket: bucket.clone(),
            items: share,
        });
    }

    Ok(Distribution { shares, moves })
}
