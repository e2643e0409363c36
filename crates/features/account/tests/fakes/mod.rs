#![allow(dead_code)]

use courier_account::AccountProvider;
use courier_bridge::{ErrorInfo, OnFailure, OnSuccess, RemoteStore, Visibility};
use courier_domain::account::{
    LinkAppleRequest, LinkGoogleRequest, LoginRequest, LoginResult, UsernamePasswordRequest,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-process provider that answers on background threads.
#[derive(Default)]
pub struct FakeProvider {
    pub calls: Mutex<Vec<String>>,
    pub logins: Mutex<Vec<LoginRequest>>,
    pub data: Mutex<HashMap<String, (String, Visibility)>>,
    failures: Mutex<HashMap<&'static str, ErrorInfo>>,
    silent: Mutex<Vec<&'static str>>,
    parked: Mutex<Vec<Box<dyn std::any::Any + Send>>>,
    accounts: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, op: &'static str, info: ErrorInfo) {
        self.failures.lock().insert(op, info);
    }

    /// Keeps the continuations of `op` alive without ever calling them.
    pub fn never_answer(&self, op: &'static str) {
        self.silent.lock().push(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == op).count()
    }

    fn answer<T: Send + 'static>(
        &self,
        op: &'static str,
        value: T,
        on_success: OnSuccess<T>,
        on_failure: OnFailure,
    ) {
        self.calls.lock().push(op.to_owned());

        if self.silent.lock().contains(&op) {
            self.parked.lock().push(Box::new((on_success, on_failure)));
            return;
        }

        let failure = self.failures.lock().get(op).cloned();
        std::thread::spawn(move || match failure {
            Some(info) => on_failure(info),
            None => on_success(value),
        });
    }
}

impl AccountProvider for FakeProvider {
    fn login_with_custom_id(
        &self,
        request: LoginRequest,
        on_success: OnSuccess<LoginResult>,
        on_failure: OnFailure,
    ) {
        let newly_created = {
            let mut accounts = self.accounts.lock();
            if accounts.contains(&request.custom_id) {
                false
            } else {
                accounts.push(request.custom_id.clone());
                true
            }
        };
        let result = LoginResult {
            player_id: format!("player-{}", &request.custom_id[..6]),
            session_ticket: format!("ticket-{}", request.custom_id),
            newly_created,
            display_name: None,
        };
        self.logins.lock().push(request);
        self.answer("login", result, on_success, on_failure);
    }

    fn update_display_name(
        &self,
        display_name: String,
        on_success: OnSuccess<String>,
        on_failure: OnFailure,
    ) {
        self.answer("display_name", display_name, on_success, on_failure);
    }

    fn add_or_update_contact_email(
        &self,
        _email: String,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    ) {
        self.answer("contact_email", (), on_success, on_failure);
    }

    fn link_google(&self, _request: LinkGoogleRequest, on_success: OnSuccess<()>, on_failure: OnFailure) {
        self.answer("link_google", (), on_success, on_failure);
    }

    fn link_apple(&self, _request: LinkAppleRequest, on_success: OnSuccess<()>, on_failure: OnFailure) {
        self.answer("link_apple", (), on_success, on_failure);
    }

    fn add_username_password(
        &self,
        request: UsernamePasswordRequest,
        on_success: OnSuccess<String>,
        on_failure: OnFailure,
    ) {
        self.answer("username_password", request.username, on_success, on_failure);
    }
}

impl RemoteStore for FakeProvider {
    fn get(&self, key: &str, on_success: OnSuccess<Option<String>>, on_failure: OnFailure) {
        let value = self.data.lock().get(key).map(|(blob, _)| blob.clone());
        self.answer("get", value, on_success, on_failure);
    }

    fn put(
        &self,
        key: &str,
        blob: String,
        visibility: Visibility,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    ) {
        if !self.failures.lock().contains_key("put") {
            self.data.lock().insert(key.to_owned(), (blob, visibility));
        }
        self.answer("put", (), on_success, on_failure);
    }
}
