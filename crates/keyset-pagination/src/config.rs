//! Page size policy for a connection

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Page size limits applied by the resolver.
///
/// # Examples
///
/// ```
/// use keyset_pagination::PaginationConfig;
///
/// // Use defaults
/// let config = PaginationConfig::default();
///
/// // Override just one field
/// let config = PaginationConfig {
///     max_page_size: 50,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
   /// Page size used when the caller supplies neither `first` nor `last`.
   ///
   /// Every request is bounded; there is no "fetch everything" mode.
   ///
   /// Default: 20
   pub default_page_size: usize,

   /// Largest `first`/`last` a caller may request.
   ///
   /// Larger values are rejected rather than clamped.
   ///
   /// Default: 100
   pub max_page_size: usize,
}

impl Default for PaginationConfig {
   fn default() -> Self {
      Self {
         default_page_size: 20,
         max_page_size: 100,
      }
   }
}

impl PaginationConfig {
   pub fn validate(&self) -> Result<(), ConfigError> {
      if self.default_page_size == 0 || self.max_page_size == 0 {
         return Err(ConfigError::ZeroPageSize);
      }
      if self.default_page_size > self.max_page_size {
         return Err(ConfigError::DefaultExceedsMax {
            default: self.default_page_size,
            max: self.max_page_size,
         });
      }
      Ok(())
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn default_is_valid() {
      assert_eq!(PaginationConfig::default().validate(), Ok(()));
   }

   #[test]
   fn rejects_zero_sizes() {
      let config = PaginationConfig {
         default_page_size: 0,
         ..Default::default()
      };
      assert_eq!(config.validate(), Err(ConfigError::ZeroPageSize));
   }

   #[test]
   fn rejects_default_above_max() {
      let config = PaginationConfig {
         default_page_size: 50,
         max_page_size: 10,
      };
      assert_eq!(
         config.validate(),
         Err(ConfigError::DefaultExceedsMax {
            default: 50,
            max: 10
         })
      );
   }
}
