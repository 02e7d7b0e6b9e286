//! Session notifications delivered by the refresh coordinator and login flows.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Receives session lifecycle notifications.
///
/// Implementations are invoked inline from the flow that caused the change, so they must not
/// block. Both methods default to no-ops.
pub trait SessionObserver
where
	Self: Send + Sync,
{
	/// A new access token was persisted (refresh or login).
	fn token_refreshed(&self, access_token: &TokenSecret) {
		let _ = access_token;
	}

	/// The stored token pair was cleared; the user should be sent to `login_path`.
	fn session_ended(&self, login_path: &str) {
		let _ = login_path;
	}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSessionObserver;
impl SessionObserver for NoopSessionObserver {}

/// Session notification captured by [`RecordingObserver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// Carries the exposed access token value.
	TokenRefreshed(String),
	/// Carries the login path the user should be redirected to.
	SessionEnded(String),
}

/// Observer that records every notification in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver(Arc<Mutex<Vec<SessionEvent>>>);
impl RecordingObserver {
	/// Returns the notifications received so far.
	pub fn events(&self) -> Vec<SessionEvent> {
		self.0.lock().clone()
	}
}
impl SessionObserver for RecordingObserver {
	fn token_refreshed(&self, access_token: &TokenSecret) {
		self.0.lock().push(SessionEvent::TokenRefreshed(access_token.expose().to_owned()));
	}

	fn session_ended(&self, login_path: &str) {
		self.0.lock().push(SessionEvent::SessionEnded(login_path.to_owned()));
	}
}

/// Fans one notification out to several observers in registration order.
#[derive(Clone, Default)]
pub struct ObserverSet(Vec<Arc<dyn SessionObserver>>);
impl ObserverSet {
	/// Adds an observer.
	pub fn with(mut self, observer: Arc<dyn SessionObserver>) -> Self {
		self.0.push(observer);

		self
	}
}
impl SessionObserver for ObserverSet {
	fn token_refreshed(&self, access_token: &TokenSecret) {
		self.0.iter().for_each(|observer| observer.token_refreshed(access_token));
	}

	fn session_ended(&self, login_path: &str) {
		self.0.iter().for_each(|observer| observer.session_ended(login_path));
	}
}
impl Debug for ObserverSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ObserverSet").field(&self.0.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn observer_set_fans_out_in_order() {
		let first = RecordingObserver::default();
		let second = RecordingObserver::default();
		let set = ObserverSet::default()
			.with(Arc::new(first.clone()))
			.with(Arc::new(NoopSessionObserver))
			.with(Arc::new(second.clone()));

		set.token_refreshed(&TokenSecret::new("A2"));
		set.session_ended("/login");

		let expected = vec![
			SessionEvent::TokenRefreshed("A2".into()),
			SessionEvent::SessionEnded("/login".into()),
		];

		assert_eq!(first.events(), expected);
		assert_eq!(second.events(), expected);
	}
}
