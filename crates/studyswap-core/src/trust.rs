//! TrustScore — the bounded reputation value gating match participation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A user's reputation, clamped to `[MIN, MAX]`.
///
/// Each completed exchange raises it by one, each confirmed bad exchange
/// lowers it by one; both saturate at the bounds rather than erroring.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i8", into = "i8")]
pub struct TrustScore(i8);

impl TrustScore {
  pub const MAX: i8 = 5;
  pub const MIN: i8 = -5;
  /// Scores below this can neither send nor receive match requests.
  pub const PARTICIPATION_THRESHOLD: i8 = 0;

  /// Construct a score, rejecting values outside the range.
  pub fn new(value: i8) -> Result<Self> {
    if !(Self::MIN..=Self::MAX).contains(&value) {
      return Err(Error::TrustScoreOutOfRange(value));
    }
    Ok(Self(value))
  }

  pub fn value(self) -> i8 { self.0 }

  pub fn is_above_threshold(self) -> bool {
    self.0 >= Self::PARTICIPATION_THRESHOLD
  }

  /// One good exchange: +1, saturating at [`Self::MAX`].
  pub fn increased(self) -> Self { Self((self.0 + 1).min(Self::MAX)) }

  /// One bad exchange: -1, saturating at [`Self::MIN`].
  pub fn decreased(self) -> Self { Self((self.0 - 1).max(Self::MIN)) }
}

impl Default for TrustScore {
  fn default() -> Self { Self(0) }
}

impl From<TrustScore> for i8 {
  fn from(score: TrustScore) -> i8 { score.0 }
}

impl TryFrom<i8> for TrustScore {
  type Error = Error;

  fn try_from(value: i8) -> Result<Self> { Self::new(value) }
}
