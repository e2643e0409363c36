use courier_bridge::{OnFailure, OnSuccess};
use courier_domain::account::{
    LinkAppleRequest, LinkGoogleRequest, LoginRequest, LoginResult, UsernamePasswordRequest,
};

/// Callback-style account API of the remote player-services provider.
///
/// Every operation takes a success and a failure continuation; exactly one
/// of them should be invoked, on any thread.
pub trait AccountProvider: Send + Sync {
    fn login_with_custom_id(
        &self,
        request: LoginRequest,
        on_success: OnSuccess<LoginResult>,
        on_failure: OnFailure,
    );

    /// Reports the display name the provider actually stored.
    fn update_display_name(
        &self,
        display_name: String,
        on_success: OnSuccess<String>,
        on_failure: OnFailure,
    );

    fn add_or_update_contact_email(
        &self,
        email: String,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    );

    fn link_google(&self, request: LinkGoogleRequest, on_success: OnSuccess<()>, on_failure: OnFailure);

    fn link_apple(&self, request: LinkAppleRequest, on_success: OnSuccess<()>, on_failure: OnFailure);

    /// Reports the username that was registered.
    fn add_username_password(
        &self,
        request: UsernamePasswordRequest,
        on_success: OnSuccess<String>,
        on_failure: OnFailure,
    );
}
