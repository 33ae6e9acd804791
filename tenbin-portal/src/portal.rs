//! Captive portal request handling

use core::net::Ipv4Addr;

use heapless::{String, Vec};
use tenbin_hal::{
    CredentialError, WifiCredentials, WifiNetwork, MAX_PASSWORD_LEN, MAX_SCAN_RESULTS,
    MAX_SSID_LEN,
};

use crate::json::scan_json;
use crate::page;
use crate::query::{self, QueryError};
use crate::request::{Method, Request};
use crate::response::{Response, Status, JSON_BODY_LEN, LOCATION_LEN};
use crate::routes::Route;

/// Networks listed by `/scan`
pub const SCAN_LIMIT: usize = 10;

/// Why a `/config` submission was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigRejection {
    MissingSsid,
    MissingPassword,
    /// A value failed to decode
    Encoding(QueryError),
    /// Decoded values failed credential validation
    Invalid(CredentialError),
}

/// What a request amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Setup page served
    Page,
    /// Captive-portal probe answered
    Probe,
    /// Unknown path redirected to the portal
    Redirect,
    /// Scan results served
    Scan,
    /// Credentials accepted and latched
    Accepted,
    /// Submission refused with 400
    Rejected(ConfigRejection),
    /// Submission after the latch was set; redirected, not stored
    AlreadyConfigured,
    /// Unsupported method
    MethodNotAllowed,
}

/// One handled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub response: Response,
    pub outcome: Outcome,
}

impl Exchange {
    fn new(response: Response, outcome: Outcome) -> Self {
        Self { response, outcome }
    }
}

/// Captive portal state
///
/// Holds the configured latch: the first valid submission is kept until
/// taken, every later one is redirected and dropped.
#[derive(Debug, Clone)]
pub struct CaptivePortal {
    address: Ipv4Addr,
    redirect_url: String<LOCATION_LEN>,
    configured: bool,
    pending: Option<WifiCredentials>,
}

impl CaptivePortal {
    /// Create a portal served at `address`, sending probes to `redirect_url`
    pub fn new(address: Ipv4Addr, redirect_url: &str) -> Self {
        let mut url = String::new();
        let _ = url.push_str(redirect_url);
        Self {
            address,
            redirect_url: url,
            configured: false,
            pending: None,
        }
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn redirect_url(&self) -> &str {
        self.redirect_url.as_str()
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Take the accepted credentials (once)
    pub fn take_credentials(&mut self) -> Option<WifiCredentials> {
        self.pending.take()
    }

    /// Handle one request
    ///
    /// `scan` is only invoked for `/scan`, with the maximum number of
    /// networks wanted. `HEAD` gets the same status and headers without
    /// the body.
    pub fn handle<F>(&mut self, request: &Request<'_>, scan: F) -> Exchange
    where
        F: FnOnce(usize) -> Vec<WifiNetwork, MAX_SCAN_RESULTS>,
    {
        let mut exchange = self.route(request, scan);
        if request.method == Method::Head {
            exchange.response = exchange.response.head_only();
        }
        exchange
    }

    fn route<F>(&mut self, request: &Request<'_>, scan: F) -> Exchange
    where
        F: FnOnce(usize) -> Vec<WifiNetwork, MAX_SCAN_RESULTS>,
    {
        if request.method == Method::Other {
            return Exchange::new(
                Response::text(Status::MethodNotAllowed, "Method Not Allowed"),
                Outcome::MethodNotAllowed,
            );
        }

        match Route::from_path(request.path) {
            Route::Index => {
                Exchange::new(Response::html(Status::Ok, page::INDEX_HTML), Outcome::Page)
            }
            Route::AppleProbe => {
                Exchange::new(Response::html(Status::Ok, page::INDEX_HTML), Outcome::Probe)
            }
            Route::Config => self.handle_config(request),
            Route::Scan => {
                let networks = scan(SCAN_LIMIT);
                let body: String<JSON_BODY_LEN> = scan_json(&networks);
                Exchange::new(Response::json(body), Outcome::Scan)
            }
            Route::AndroidProbe => {
                Exchange::new(Response::redirect(&self.redirect_url), Outcome::Probe)
            }
            Route::WindowsProbe => Exchange::new(
                Response::text(Status::Ok, page::WINDOWS_PROBE_BODY),
                Outcome::Probe,
            ),
            Route::SuccessProbe => Exchange::new(
                Response::text(Status::Ok, page::SUCCESS_PROBE_BODY),
                Outcome::Probe,
            ),
            Route::Unknown => {
                Exchange::new(Response::redirect(&self.redirect_url), Outcome::Redirect)
            }
        }
    }

    fn handle_config(&mut self, request: &Request<'_>) -> Exchange {
        if self.configured {
            return Exchange::new(
                Response::redirect(&self.redirect_url),
                Outcome::AlreadyConfigured,
            );
        }

        match parse_submission(request) {
            Ok(credentials) => {
                self.configured = true;
                self.pending = Some(credentials);
                Exchange::new(Response::html(Status::Ok, page::SAVED_HTML), Outcome::Accepted)
            }
            Err(rejection) => {
                let body = match rejection {
                    ConfigRejection::MissingSsid | ConfigRejection::MissingPassword => {
                        "Missing parameters"
                    }
                    _ => "Invalid parameters",
                };
                Exchange::new(
                    Response::text(Status::BadRequest, body),
                    Outcome::Rejected(rejection),
                )
            }
        }
    }
}

fn parse_submission(request: &Request<'_>) -> Result<WifiCredentials, ConfigRejection> {
    let ssid_raw = request.param("ssid").ok_or(ConfigRejection::MissingSsid)?;
    let password_raw = request
        .param("password")
        .ok_or(ConfigRejection::MissingPassword)?;

    let ssid: String<MAX_SSID_LEN> = query::decode(ssid_raw).map_err(|e| match e {
        QueryError::TooLong => ConfigRejection::Invalid(CredentialError::SsidTooLong),
        other => ConfigRejection::Encoding(other),
    })?;
    let password: String<MAX_PASSWORD_LEN> = query::decode(password_raw).map_err(|e| match e {
        QueryError::TooLong => ConfigRejection::Invalid(CredentialError::PasswordTooLong),
        other => ConfigRejection::Encoding(other),
    })?;

    WifiCredentials::new(&ssid, &password).map_err(ConfigRejection::Invalid)
}
