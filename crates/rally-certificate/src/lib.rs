//! Participation certificate rendering for Rally.
//!
//! Converts already-loaded event and user fields into a downloadable PDF.
//! Pure synchronous; no HTTP or database dependencies, and no side effects
//! on the store — the certificate is a function of its inputs and nothing
//! else.
//!
//! # Quick start
//!
//! ```no_run
//! use chrono::Utc;
//! use rally_certificate::Certificate;
//!
//! let cert = Certificate {
//!   participant_email: "alice@example.com".into(),
//!   event_title:       "Rust Meetup".into(),
//!   event_date:        Utc::now(),
//! };
//! let bytes = cert.render().unwrap();
//! std::fs::write(cert.filename(), bytes).unwrap();
//! ```

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("pdf error: {0}")]
  Pdf(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// A4 portrait; text y-positions measured from the top edge, matching the
// layout the certificate has always used.
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;

/// The fields printed on a certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
  pub participant_email: String,
  pub event_title:       String,
  pub event_date:        DateTime<Utc>,
}

impl Certificate {
  /// The download name for this certificate: `<event title>-certificate.pdf`.
  pub fn filename(&self) -> String {
    format!("{}-certificate.pdf", self.event_title)
  }

  /// Render the certificate as PDF bytes.
  ///
  /// Fixed single-page layout: heading, a rule beneath it, then the
  /// certification text with the participant email, event title, and date.
  pub fn render(&self) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
      "Certificado de Participación",
      Mm(PAGE_W),
      Mm(PAGE_H),
      "certificate",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let font = doc
      .add_builtin_font(BuiltinFont::Helvetica)
      .map_err(|e| Error::Pdf(e.to_string()))?;

    let text = |s: &str, size: f32, x: f32, y_from_top: f32| {
      layer.use_text(s, size, Mm(x), Mm(PAGE_H - y_from_top), &font);
    };

    text("Certificado de Participación", 24.0, 40.0, 40.0);

    // Rule under the heading.
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
      points:    vec![
        (Point::new(Mm(30.0), Mm(PAGE_H - 45.0)), false),
        (Point::new(Mm(180.0), Mm(PAGE_H - 45.0)), false),
      ],
      is_closed: false,
    });

    text("Esto es para certificar que", 16.0, 55.0, 80.0);
    text(&self.participant_email, 20.0, 45.0, 100.0);
    text("ha participado en", 16.0, 65.0, 120.0);
    text(&self.event_title, 20.0, 45.0, 140.0);
    text(
      &format!("on {}", self.event_date.format("%d/%m/%Y")),
      14.0,
      75.0,
      160.0,
    );

    doc.save_to_bytes().map_err(|e| Error::Pdf(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  fn cert() -> Certificate {
    Certificate {
      participant_email: "alice@example.com".into(),
      event_title:       "Rust Meetup".into(),
      event_date:        Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap(),
    }
  }

  #[test]
  fn filename_follows_the_event_title() {
    assert_eq!(cert().filename(), "Rust Meetup-certificate.pdf");
  }

  #[test]
  fn render_produces_a_pdf() {
    let bytes = cert().render().unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
  }

  #[test]
  fn render_depends_only_on_its_inputs() {
    // printpdf embeds a creation timestamp, so the bytes are not stable,
    // but the document structure is: same inputs, same size.
    let a = cert().render().unwrap();
    let b = cert().render().unwrap();
    assert_eq!(a.len(), b.len());
  }
}
