//! Trial-division classifier
//!
//! The leaf of the engine: turns a single integer into its full divisor list.
//! Everything here is pure and safe to call from any number of threads at once.

/// Ascending list of every positive divisor of a number, including 1 and the number itself.
pub type DivisorList = Vec<u64>;

/// Outcome of classifying a single integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Prime(u64),
    Composite(u64, DivisorList),
}

impl Classification {
    /// Classify `n` by building its divisor list
    ///
    /// Exactly two divisors means prime; anything else is recorded as composite
    /// together with the list.
    pub fn of(n: u64) -> Self {
        Self::from_divisors(n, factors(n))
    }

    pub fn from_divisors(n: u64, divisors: DivisorList) -> Self {
        if divisors.len() == 2 {
            Classification::Prime(n)
        } else {
            Classification::Composite(n, divisors)
        }
    }

    pub fn value(&self) -> u64 {
        match self {
            Classification::Prime(n) | Classification::Composite(n, _) => *n,
        }
    }

    pub fn is_prime(&self) -> bool {
        matches!(self, Classification::Prime(_))
    }
}

/// Return every divisor of `n` in ascending order
///
/// Scans `1..=floor(sqrt(n))`; each hit `i` contributes `i` and its cofactor
/// `n / i`, the cofactor only once when `i * i == n`.
///
/// Caller guarantees `n > 1`.
pub fn factors(n: u64) -> DivisorList {
    let mut small = Vec::new();
    let mut large = Vec::new();

    let mut i = 1u64;
    while i <= n / i {
        if n % i == 0 {
            small.push(i);
            let cofactor = n / i;
            if cofactor != i {
                large.push(cofactor);
            }
        }
        i += 1;
    }

    // small is ascending and large is descending, so the join is already sorted
    large.reverse();
    small.extend(large);
    small
}

/// Boolean-only primality check over the same scan, without building a list
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }

    let mut i = 2u64;
    while i <= n / i {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}
