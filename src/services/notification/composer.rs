use crate::config::EventConfig;
use crate::domain::delivery::{NotificationPayload, Tag};
use crate::domain::submission::{Locale, Submission};
use std::fmt::Write as _;

struct GuestStrings {
    subject_confirmed: &'static str,
    subject_received: &'static str,
    greeting: &'static str,
    attending_heading: &'static str,
    attending_body: &'static str,
    declining_heading: &'static str,
    declining_body: &'static str,
    details_heading: &'static str,
    date_label: &'static str,
    venue_label: &'static str,
    address_label: &'static str,
    summary_heading: &'static str,
    guest_label: &'static str,
    email_label: &'static str,
    attendance_label: &'static str,
    yes_word: &'static str,
    no_word: &'static str,
    dietary_line: &'static str,
    companion_label: &'static str,
    companion_dietary_line: &'static str,
    signoff: &'static str,
}

const EN: GuestStrings = GuestStrings {
    subject_confirmed: "RSVP Confirmed",
    subject_received: "RSVP Received",
    greeting: "Dear",
    attending_heading: "We're so excited you'll be joining us!",
    attending_body: "Thank you for confirming your attendance at our wedding celebration.",
    declining_heading: "Thank you for letting us know",
    declining_body: "We're sorry you can't make it, and we'll be thinking of you on the day.",
    details_heading: "Event details",
    date_label: "Date",
    venue_label: "Venue",
    address_label: "Address",
    summary_heading: "Your RSVP details",
    guest_label: "Guest",
    email_label: "Email",
    attendance_label: "Attending",
    yes_word: "Yes",
    no_word: "No",
    dietary_line: "Vegetarian meal requested",
    companion_label: "Plus one",
    companion_dietary_line: "Vegetarian meal requested for your guest",
    signoff: "With love and excitement,",
};

const FR: GuestStrings = GuestStrings {
    subject_confirmed: "RSVP confirmé",
    subject_received: "RSVP reçu",
    greeting: "Bonjour",
    attending_heading: "Nous sommes ravis de vous compter parmi nous !",
    attending_body: "Merci d'avoir confirmé votre présence à notre mariage.",
    declining_heading: "Merci de nous avoir prévenus",
    declining_body: "Nous sommes désolés que vous ne puissiez pas venir, nous penserons à vous ce jour-là.",
    details_heading: "Détails de l'événement",
    date_label: "Date",
    venue_label: "Lieu",
    address_label: "Adresse",
    summary_heading: "Votre RSVP",
    guest_label: "Invité",
    email_label: "Email",
    attendance_label: "Présence",
    yes_word: "Oui",
    no_word: "Non",
    dietary_line: "Repas végétarien demandé",
    companion_label: "Accompagnant",
    companion_dietary_line: "Repas végétarien demandé pour votre accompagnant",
    signoff: "Avec tout notre amour,",
};

const RO: GuestStrings = GuestStrings {
    subject_confirmed: "RSVP confirmat",
    subject_received: "RSVP primit",
    greeting: "Dragă",
    attending_heading: "Ne bucurăm că vei fi alături de noi!",
    attending_body: "Îți mulțumim că ți-ai confirmat prezența la nunta noastră.",
    declining_heading: "Îți mulțumim că ne-ai anunțat",
    declining_body: "Ne pare rău că nu poți ajunge, ne vom gândi la tine în ziua cea mare.",
    details_heading: "Detaliile evenimentului",
    date_label: "Data",
    venue_label: "Locația",
    address_label: "Adresa",
    summary_heading: "Detaliile RSVP",
    guest_label: "Invitat",
    email_label: "Email",
    attendance_label: "Prezență",
    yes_word: "Da",
    no_word: "Nu",
    dietary_line: "Meniu vegetarian solicitat",
    companion_label: "Însoțitor",
    companion_dietary_line: "Meniu vegetarian solicitat pentru însoțitor",
    signoff: "Cu drag,",
};

const fn strings(locale: Locale) -> &'static GuestStrings {
    match locale {
        Locale::En => &EN,
        Locale::Fr => &FR,
        Locale::Ro => &RO,
    }
}

#[derive(Debug)]
pub struct ComposedNotifications {
    pub guest: NotificationPayload,
    pub admin: NotificationPayload,
}

/// Renders both notification payloads from one submission. Pure and
/// deterministic given a submission and the configured event details.
#[derive(Clone, Debug)]
pub struct NotificationComposer {
    event: EventConfig,
}

impl NotificationComposer {
    #[must_use]
    pub const fn new(event: EventConfig) -> Self {
        Self { event }
    }

    #[must_use]
    pub fn compose(&self, submission: &Submission) -> ComposedNotifications {
        ComposedNotifications { guest: self.guest_payload(submission), admin: self.admin_payload(submission) }
    }

    fn guest_payload(&self, submission: &Submission) -> NotificationPayload {
        let s = strings(submission.locale);
        let attending = submission.attendance.is_attending();

        let subject = if attending {
            format!("{}: {} - {}", s.subject_confirmed, self.event.couple_names, self.event.wedding_date)
        } else {
            format!("{}: {}", s.subject_received, self.event.couple_names)
        };

        let mut html = String::new();
        let _ = write!(html, "<h1>{}</h1><p>{}</p>", self.event.couple_names, self.event.wedding_date);
        let _ = write!(html, "<p>{} {},</p>", s.greeting, submission.first_name);

        if attending {
            let _ = write!(html, "<h3>{}</h3><p>{}</p>", s.attending_heading, s.attending_body);
            let _ = write!(
                html,
                "<h3>{}</h3><p>{}: {}<br>{}: {}<br>{}: {}</p>",
                s.details_heading,
                s.date_label,
                self.event.wedding_date,
                s.venue_label,
                self.event.venue_name,
                s.address_label,
                self.event.venue_address,
            );
        } else {
            let _ = write!(html, "<h3>{}</h3><p>{}</p>", s.declining_heading, s.declining_body);
        }

        let _ = write!(
            html,
            "<h3>{}</h3><p>{}: {}<br>{}: {}<br>{}: {}",
            s.summary_heading,
            s.guest_label,
            submission.full_name(),
            s.email_label,
            submission.email,
            s.attendance_label,
            if attending { s.yes_word } else { s.no_word },
        );
        if submission.vegetarian {
            let _ = write!(html, "<br>{}", s.dietary_line);
        }
        if let Some(companion) = &submission.plus_one {
            let _ = write!(html, "<br>{}: {} {}", s.companion_label, companion.first_name, companion.last_name);
            if companion.vegetarian {
                let _ = write!(html, "<br>{}", s.companion_dietary_line);
            }
        }
        html.push_str("</p>");

        let _ = write!(html, "<p>{}<br><strong>{}</strong></p>", s.signoff, self.event.couple_names);

        NotificationPayload {
            subject,
            html,
            tags: vec![
                Tag { name: "type", value: "guest-confirmation".to_string() },
                Tag { name: "attending", value: submission.attendance.as_str().to_string() },
                Tag { name: "language", value: submission.locale.as_str().to_string() },
            ],
        }
    }

    // Admin notifications are not localized.
    fn admin_payload(&self, submission: &Submission) -> NotificationPayload {
        let attending = submission.attendance.is_attending();
        let subject = format!(
            "New RSVP: {} - {}",
            submission.full_name(),
            if attending { "Attending" } else { "Not attending" },
        );

        let mut html = String::new();
        html.push_str("<h1>New RSVP Submission</h1>");
        let _ = write!(
            html,
            "<h3>Guest information</h3><p>Name: {}<br>Email: {}<br>Attending: {}<br>Vegetarian meal: {}<br>Language: {}</p>",
            submission.full_name(),
            submission.email,
            if attending { "Yes" } else { "No" },
            if submission.vegetarian { "Yes" } else { "No" },
            submission.locale.as_str().to_uppercase(),
        );

        if let Some(companion) = &submission.plus_one {
            let _ = write!(
                html,
                "<h3>Plus one</h3><p>Name: {} {}<br>Vegetarian meal: {}</p>",
                companion.first_name,
                companion.last_name,
                if companion.vegetarian { "Yes" } else { "No" },
            );
        }

        if let Some(message) = &submission.message {
            let _ = write!(html, "<h3>Message</h3><p>{message}</p>");
        }

        NotificationPayload {
            subject,
            html,
            tags: vec![
                Tag { name: "type", value: "admin-notification".to_string() },
                Tag { name: "attending", value: submission.attendance.as_str().to_string() },
            ],
        }
    }
}
