// Outbound account mail. Delivery transport is an external collaborator; the
// service composes the two fixed messages and hands them to the log sink.

#[derive(Clone)]
pub struct Mailer {
    host: String,
}

impl Mailer {
    pub fn new(host: String) -> Self {
        Self { host }
    }

    pub fn activation_link(&self, token: &str) -> String {
        format!("{}/user/active?token={}", self.host, token)
    }

    pub fn password_set_link(&self, token: &str) -> String {
        format!("{}/user/password/set?token={}", self.host, token)
    }

    pub fn send_activation(&self, email: &str, username: &str, token: &str) {
        let body = format!(
            "Hi {}, your account activation link: {}",
            username,
            self.activation_link(token)
        );
        self.deliver(email, "Account registration", &body);
    }

    pub fn send_password_set(&self, email: &str, username: &str, token: &str) {
        let body = format!(
            "Hi {}, your link to set a new password: {}",
            username,
            self.password_set_link(token)
        );
        self.deliver(email, "Password reset", &body);
    }

    fn deliver(&self, to: &str, subject: &str, body: &str) {
        tracing::info!(to, subject, body, "sending email");
    }
}
