//! Transient client-side session state and page navigation guards.
//!
//! Nothing here is persisted: dropping the [`Session`] is the same as
//! refreshing the page.

use plantcare_core::{user::UserProfile, wire::AnalyzeResponse};

/// The screens of the client flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
  Landing,
  SignUp,
  SignIn,
  Home,
  Scanner,
  Result,
}

/// The signed-in user and the most recent scan result.
#[derive(Debug, Default)]
pub struct Session {
  user:      Option<UserProfile>,
  last_scan: Option<AnalyzeResponse>,
}

impl Session {
  pub fn new() -> Self { Self::default() }

  pub fn user(&self) -> Option<&UserProfile> { self.user.as_ref() }

  pub fn last_scan(&self) -> Option<&AnalyzeResponse> { self.last_scan.as_ref() }

  pub fn login(&mut self, user: UserProfile) { self.user = Some(user); }

  /// Forget both the user and their last scan.
  pub fn logout(&mut self) {
    self.user = None;
    self.last_scan = None;
  }

  pub fn record_scan(&mut self, result: AnalyzeResponse) {
    self.last_scan = Some(result);
  }

  /// The page actually shown when `requested` is asked for.
  ///
  /// Home and Scanner need a user, else SignIn. Result needs a user and a
  /// scan, else Home (which in turn falls back to SignIn).
  pub fn resolve(&self, requested: Page) -> Page {
    match requested {
      Page::Home | Page::Scanner if self.user.is_none() => Page::SignIn,
      Page::Result if self.user.is_none() => Page::SignIn,
      Page::Result if self.last_scan.is_none() => Page::Home,
      page => page,
    }
  }
}
