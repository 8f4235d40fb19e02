use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "val" | "validation" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            other => Err(format!("unknown split: {other}")),
        }
    }
}

/// 80 / 10 / 10 partition of `[0, n)`. Test takes the truncation remainder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitIndices {
    train: Vec<usize>,
    val: Vec<usize>,
    test: Vec<usize>,
}

impl SplitIndices {
    /// `(floor(0.8n), floor(0.1n), rest)`, in integer arithmetic.
    pub fn sizes(n: usize) -> (usize, usize, usize) {
        let train = n * 8 / 10;
        let val = n / 10;
        (train, val, n - train - val)
    }

    pub fn derive(n: usize, seed: u64) -> Self {
        Self::derive_with(n, &mut rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Shuffle the identity permutation with `rng`, then slice.
    pub fn derive_with<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(rng);

        let (train_len, val_len, _) = Self::sizes(n);
        let test = perm.split_off(train_len + val_len);
        let val = perm.split_off(train_len);
        let train = perm;

        tracing::debug!(
            n,
            train = train.len(),
            val = val.len(),
            test = test.len(),
            "derived split"
        );

        Self { train, val, test }
    }

    pub fn indices(&self, split: Split) -> &[usize] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn train(&self) -> &[usize] {
        &self.train
    }

    pub fn val(&self) -> &[usize] {
        &self.val
    }

    pub fn test(&self) -> &[usize] {
        &self.test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_partition() {
        for n in [0, 1, 7, 100, 3401] {
            assert_eq!(SplitIndices::derive(n, 0), SplitIndices::derive(n, 0));
        }
    }

    #[test]
    fn test_sizes_and_disjoint_cover() {
        for n in [0usize, 1, 9, 10, 19, 100, 4514] {
            let s = SplitIndices::derive(n, 0);
            let (tr, va, te) = SplitIndices::sizes(n);
            assert_eq!(s.train().len(), tr);
            assert_eq!(s.val().len(), va);
            assert_eq!(s.test().len(), te);
            assert_eq!(tr + va + te, n);

            let all: HashSet<usize> = Split::ALL
                .iter()
                .flat_map(|sp| s.indices(*sp).iter().copied())
                .collect();
            assert_eq!(all.len(), n, "splits overlap for n={n}");
            assert!(all.iter().all(|i| *i < n));
        }
    }

    #[test]
    fn test_remainder_goes_to_test() {
        // 19 -> 15 / 1 / 3
        assert_eq!(SplitIndices::sizes(19), (15, 1, 3));
        assert_eq!(SplitIndices::sizes(100), (80, 10, 10));
    }

    #[test]
    fn test_actually_shuffles() {
        let s = SplitIndices::derive(100, 0);
        let identity: Vec<usize> = (0..80).collect();
        assert_ne!(s.train(), identity.as_slice());
    }

    #[test]
    fn test_parse_split() {
        assert_eq!("train".parse::<Split>().unwrap(), Split::Train);
        assert_eq!("VAL".parse::<Split>().unwrap(), Split::Val);
        assert!("holdout".parse::<Split>().is_err());
    }
}
