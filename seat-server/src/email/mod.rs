//! Feedback mail via AWS SES

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use shared::models::FeedbackRequest;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Subject of the notice sent to the board administrator
pub fn admin_subject(name: &str) -> String {
    format!("[Seat Board] Feedback from {name}")
}

pub const AUTO_REPLY_SUBJECT: &str = "[Seat Board] We received your feedback";

fn admin_body(feedback: &FeedbackRequest) -> String {
    format!(
        "Name: {}\n\
         Email: {}\n\n\
         Feedback:\n{}\n",
        feedback.name, feedback.email, feedback.message
    )
}

fn auto_reply_body(feedback: &FeedbackRequest) -> String {
    format!(
        "Dear {},\n\n\
         Thank you for sending feedback about the seat board.\n\
         We received the following:\n\n\
         {}\n\n\
         We will review it and get back to you if a reply is needed.\n\n\
         -- Seat Board team\n\
         (This message was sent automatically; please do not reply.)\n",
        feedback.name, feedback.message
    )
}

async fn send_text(ses: &SesClient, from: &str, to: &str, subject: &str, text: String) -> Result<(), BoxError> {
    let subject = Content::builder().data(subject).build()?;
    let body = Body::builder()
        .text(Content::builder().data(text).build()?)
        .build();
    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;
    Ok(())
}

/// One plain-text mail ready to hand to SES
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// The admin notice followed by the submitter's auto-reply
pub fn feedback_mails(admin_to: &str, feedback: &FeedbackRequest) -> [OutgoingMail; 2] {
    [
        OutgoingMail {
            to: admin_to.to_string(),
            subject: admin_subject(&feedback.name),
            text: admin_body(feedback),
        },
        OutgoingMail {
            to: feedback.email.clone(),
            subject: AUTO_REPLY_SUBJECT.to_string(),
            text: auto_reply_body(feedback),
        },
    ]
}

/// Admin notice and submitter auto-reply, sent concurrently. Fails if either fails.
pub async fn send_feedback(
    ses: &SesClient,
    from: &str,
    admin_to: &str,
    feedback: &FeedbackRequest,
) -> Result<(), BoxError> {
    let [notice, reply] = feedback_mails(admin_to, feedback);
    tokio::try_join!(
        send_text(ses, from, &notice.to, &notice.subject, notice.text.clone()),
        send_text(ses, from, &reply.to, &reply.subject, reply.text.clone()),
    )?;

    tracing::info!(from_name = %feedback.name, "Feedback mail sent");
    Ok(())
}
