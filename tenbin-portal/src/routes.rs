//! Path routing

/// Portal routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    /// Setup page
    Index,
    /// Credential submission
    Config,
    /// Network scan JSON
    Scan,
    /// Android connectivity check; must not return 204
    AndroidProbe,
    /// Apple captive network assistant
    AppleProbe,
    /// Windows NCSI
    WindowsProbe,
    /// Firefox / generic success probe
    SuccessProbe,
    /// Anything else; redirected to the portal
    Unknown,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" | "/index.html" => Route::Index,
            "/config" => Route::Config,
            "/scan" => Route::Scan,
            "/generate_204" | "/gen_204" => Route::AndroidProbe,
            "/hotspot-detect.html" => Route::AppleProbe,
            "/connecttest.txt" => Route::WindowsProbe,
            "/success.txt" => Route::SuccessProbe,
            _ => Route::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        assert_eq!(Route::from_path("/"), Route::Index);
        assert_eq!(Route::from_path("/config"), Route::Config);
        assert_eq!(Route::from_path("/generate_204"), Route::AndroidProbe);
        assert_eq!(Route::from_path("/hotspot-detect.html"), Route::AppleProbe);
        assert_eq!(Route::from_path("/connecttest.txt"), Route::WindowsProbe);
        assert_eq!(Route::from_path("/success.txt"), Route::SuccessProbe);
        assert_eq!(Route::from_path("/favicon.ico"), Route::Unknown);
    }
}
