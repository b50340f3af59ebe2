//! Transactional email bodies.

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    /// Subject line.
    pub subject: &'static str,
    /// HTML body.
    pub html: String,
}

/// Verification code for a new or re-sent registration.
#[must_use]
pub fn verification(username: &str, code: &str) -> Letter {
    Letter {
        subject: "Verify Your Email",
        html: format!(
            r#"<div style="text-align: center; font-family: Arial, sans-serif;">
  <h1>Welcome, {username}!</h1>
  <p>Please use the following 4-digit code to verify your email:</p>
  <h2 style="color: #4CAF50; letter-spacing: 5px;">{code}</h2>
  <p>This code is valid for 24 hours.</p>
  <p>If you did not request this, please ignore this email.</p>
</div>"#
        ),
    }
}

/// Password reset code.
#[must_use]
pub fn reset_code(username: &str, code: &str) -> Letter {
    Letter {
        subject: "Password Reset Code",
        html: format!(
            r#"<div style="text-align: center; font-family: Arial, sans-serif;">
  <h1>Password Reset Request</h1>
  <p>Hello {username},</p>
  <p>You requested to reset your password. Use the code below:</p>
  <h2 style="color: #4CAF50; letter-spacing: 5px;">{code}</h2>
  <p>This code is valid for <strong>15 minutes</strong>.</p>
  <p>If you didn't request this, please ignore this email and secure your account.</p>
</div>"#
        ),
    }
}

/// Notice sent after a successful reset.
#[must_use]
pub fn reset_confirmation(username: &str) -> Letter {
    Letter {
        subject: "Password Reset Successful",
        html: format!(
            r#"<div style="text-align: center; font-family: Arial, sans-serif;">
  <h1>Password Changed</h1>
  <p>Hello {username},</p>
  <p>Your password has been successfully reset.</p>
  <p>If you didn't make this change, please contact support immediately.</p>
</div>"#
        ),
    }
}

/// Credentials for an admin-provisioned account.
#[must_use]
pub fn sub_user_credentials(username: &str, email: &str, password: &str) -> Letter {
    Letter {
        subject: "Your New Account Details",
        html: format!(
            r"<h2>Welcome to Expensa, {username}!</h2>
<p>Your account has been created by the admin.</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Password:</strong> {password}</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bodies_carry_codes() {
        assert!(verification("alice", "4821").html.contains("4821"));
        assert!(reset_code("alice", "9034").html.contains("9034"));
        assert!(sub_user_credentials("bob", "bob@x.io", "a1b2c3d4e5").html.contains("a1b2c3d4e5"));
    }
}
