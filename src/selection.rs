//! Injectable device and resolution selection policies.
//!
//! The default policy takes the first entry in enumeration order, with no
//! quality or facing heuristic. Enumeration order is not meaningful on most
//! platforms, so hosts that care should inject their own policy.

use crate::types::Resolution;

/// Chooses a camera identifier from the enumerated set.
pub trait DevicePolicy: Send + Sync {
    /// Returns `None` when no device is acceptable.
    fn select<'a>(&self, camera_ids: &'a [String]) -> Option<&'a str>;
}

/// Chooses an output resolution from the platform-reported list.
pub trait ResolutionPolicy: Send + Sync {
    /// Returns `None` when no size is acceptable.
    fn select(&self, sizes: &[Resolution]) -> Option<Resolution>;
}

/// Takes the first enumerated entry. Deterministic for a given list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstEnumerated;

impl DevicePolicy for FirstEnumerated {
    fn select<'a>(&self, camera_ids: &'a [String]) -> Option<&'a str> {
        camera_ids.first().map(String::as_str)
    }
}

impl ResolutionPolicy for FirstEnumerated {
    fn select(&self, sizes: &[Resolution]) -> Option<Resolution> {
        sizes.first().copied()
    }
}

/// Prefers the exact requested size, falling back to the reported size whose
/// pixel count is closest to it.
#[derive(Debug, Clone, Copy)]
pub struct PreferSize {
    pub preferred: Resolution,
}

impl PreferSize {
    pub fn new(preferred: Resolution) -> Self {
        Self { preferred }
    }
}

impl ResolutionPolicy for PreferSize {
    fn select(&self, sizes: &[Resolution]) -> Option<Resolution> {
        if sizes.contains(&self.preferred) {
            return Some(self.preferred);
        }
        let want = self.preferred.area();
        sizes
            .iter()
            .copied()
            .min_by_key(|s| s.area().abs_diff(want))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> Vec<Resolution> {
        vec![
            Resolution::new(1920, 1080),
            Resolution::new(1280, 720),
            Resolution::new(640, 480),
        ]
    }

    #[test]
    fn first_enumerated_device_is_deterministic() {
        let ids = vec!["0".to_string(), "1".to_string()];
        for _ in 0..3 {
            assert_eq!(DevicePolicy::select(&FirstEnumerated, &ids), Some("0"));
        }
        assert_eq!(DevicePolicy::select(&FirstEnumerated, &[]), None);
    }

    #[test]
    fn first_enumerated_resolution_takes_head_of_list() {
        assert_eq!(
            ResolutionPolicy::select(&FirstEnumerated, &sizes()),
            Some(Resolution::new(1920, 1080))
        );
        assert_eq!(ResolutionPolicy::select(&FirstEnumerated, &[]), None);
    }

    #[test]
    fn prefer_size_exact_match() {
        let policy = PreferSize::new(Resolution::new(1280, 720));
        assert_eq!(policy.select(&sizes()), Some(Resolution::new(1280, 720)));
    }

    #[test]
    fn prefer_size_falls_back_to_closest_area() {
        let policy = PreferSize::new(Resolution::new(800, 600));
        assert_eq!(policy.select(&sizes()), Some(Resolution::new(640, 480)));
        assert_eq!(policy.select(&[]), None);
    }
}
