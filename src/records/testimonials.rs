//! Testimonials: public submission, admin deletion, localized cards.

use serde_json::json;

use super::{apply, decode, require, ListChange, Rejection, ViewContext, TESTIMONIALS_TABLE};
use crate::backend::{Filter, RowStore, Select};
use crate::errors::AppError;
use crate::models::{summarize, RecordId, Testimonial, TestimonialDraft};

/// A testimonial resolved for the active language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialCard {
    pub id: RecordId,
    pub author: String,
    pub role: String,
    /// Quoted summary, or the placeholder text when there is none.
    pub summary: String,
    /// Present only when there is something to read in full.
    pub full_text: Option<String>,
    pub posted_on: String,
}

impl TestimonialDraft {
    pub fn check(&self) -> Result<(), Rejection> {
        require("author", &self.author)?;
        require("role", &self.role)?;
        require("text", &self.full_text)
    }
}

/// Displayed testimonials, newest first.
pub async fn fetch_testimonials(rows: &dyn RowStore) -> Result<Vec<Testimonial>, AppError> {
    let query = Select::columns("*")
        .eq("is_new", true)
        .order_desc("created_at");
    rows.select(TESTIMONIALS_TABLE, &query)
        .await?
        .into_iter()
        .map(|row| decode(TESTIMONIALS_TABLE, row))
        .collect()
}

/// Insert a visitor testimonial. Only the Armenian fields are filled.
pub async fn create_testimonial(
    rows: &dyn RowStore,
    draft: &TestimonialDraft,
) -> Result<Testimonial, AppError> {
    draft.check()?;

    let row = json!({
        "author": draft.author,
        "role_am": draft.role,
        "fullText_am": draft.full_text,
        "summary_am": summarize(&draft.full_text),
        "is_new": true,
    });
    decode(TESTIMONIALS_TABLE, rows.insert(TESTIMONIALS_TABLE, row).await?)
}

pub async fn delete_testimonial(rows: &dyn RowStore, id: RecordId) -> Result<(), AppError> {
    rows.delete(TESTIMONIALS_TABLE, &Filter::eq("id", id)).await
}

/// The testimonial page. Anyone may submit; only the administrator deletes.
pub struct TestimonialBoard {
    ctx: ViewContext,
    testimonials: Vec<Testimonial>,
}

impl TestimonialBoard {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            testimonials: Vec::new(),
        }
    }

    pub fn testimonials(&self) -> &[Testimonial] {
        &self.testimonials
    }

    pub fn can_delete(&self) -> bool {
        self.ctx.session.is_admin()
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        match fetch_testimonials(self.ctx.backend.rows.as_ref()).await {
            Ok(testimonials) => {
                self.testimonials = testimonials;
                Ok(())
            }
            Err(e) => {
                self.testimonials.clear();
                self.ctx.failure("testimonial_fetch_error", &e);
                Err(e)
            }
        }
    }

    pub async fn submit(&mut self, form: &mut TestimonialDraft) -> Result<RecordId, AppError> {
        if let Err(rejection) = form.check() {
            return Err(self.ctx.rejected(rejection));
        }

        match create_testimonial(self.ctx.backend.rows.as_ref(), form).await {
            Ok(testimonial) => {
                let id = testimonial.id;
                self.testimonials = apply(
                    ListChange::Created(testimonial),
                    std::mem::take(&mut self.testimonials),
                );
                *form = TestimonialDraft::default();
                self.ctx.success("form_success");
                Ok(id)
            }
            Err(e) => {
                self.ctx.failure("form_error", &e);
                Err(e)
            }
        }
    }

    pub async fn remove(&mut self, id: RecordId) -> Result<(), AppError> {
        self.ctx.require_admin()?;

        match delete_testimonial(self.ctx.backend.rows.as_ref(), id).await {
            Ok(()) => {
                self.testimonials = apply(
                    ListChange::Deleted(id),
                    std::mem::take(&mut self.testimonials),
                );
                self.ctx.success("testimonial_delete_success");
                Ok(())
            }
            Err(e) => {
                self.ctx.failure("testimonial_delete_fail", &e);
                Err(e)
            }
        }
    }

    /// Cards in the active language.
    pub fn cards(&self) -> Vec<TestimonialCard> {
        let language = self.ctx.i18n.language();
        self.testimonials
            .iter()
            .map(|t| {
                let summary = t.summary(language);
                let summary = if summary.trim().is_empty() {
                    self.ctx.i18n.t("testimonial_default_text")
                } else {
                    format!("\"{}...\"", summary)
                };
                TestimonialCard {
                    id: t.id,
                    author: t.author.clone(),
                    role: t.role(language).to_string(),
                    summary,
                    full_text: t.full_text(language).map(str::to_string),
                    posted_on: self.ctx.i18n.format_date(&t.created_at),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Call, Faults};
    use crate::i18n::Language;
    use crate::notify::Notice;
    use crate::records::test_support::Harness;

    fn draft(author: &str, role: &str, text: &str) -> TestimonialDraft {
        TestimonialDraft {
            author: author.into(),
            role: role.into(),
            full_text: text.into(),
        }
    }

    #[tokio::test]
    async fn test_only_new_testimonials_are_listed() {
        let h = Harness::new();
        h.backend
            .seed(TESTIMONIALS_TABLE, json!({ "author": "Old", "fullText_am": "x", "is_new": false }))
            .await;
        h.backend
            .seed(TESTIMONIALS_TABLE, json!({ "author": "Shown", "fullText_am": "y", "is_new": true }))
            .await;

        let mut board = TestimonialBoard::new(h.ctx.clone());
        board.load().await.unwrap();

        assert_eq!(board.testimonials().len(), 1);
        assert_eq!(board.testimonials()[0].author, "Shown");
    }

    #[tokio::test]
    async fn test_visitor_submission_appears_first() {
        let mut h = Harness::new();
        h.backend
            .seed(TESTIMONIALS_TABLE, json!({ "author": "Earlier", "fullText_am": "ok", "is_new": true }))
            .await;
        let mut board = TestimonialBoard::new(h.ctx.clone());
        board.load().await.unwrap();

        let mut form = draft("Ani", "Nurse", "Great care.");
        board.submit(&mut form).await.unwrap();

        let first = &board.testimonials()[0];
        assert_eq!(board.testimonials().len(), 2);
        assert_eq!(first.author, "Ani");
        assert_eq!(first.role_am.as_deref(), Some("Nurse"));
        assert_eq!(first.summary_am.as_deref(), Some("Great care."));
        assert!(first.is_new);
        assert_eq!(form, TestimonialDraft::default());

        let stored = h.backend.rows(TESTIMONIALS_TABLE).await;
        assert_eq!(stored.last().unwrap()["summary_am"], "Great care.");
        assert_eq!(
            h.drain(),
            vec![Notice::success("Thank you, your testimonial was sent.")]
        );
    }

    #[tokio::test]
    async fn test_long_text_summary_is_truncated() {
        let h = Harness::new();
        let mut board = TestimonialBoard::new(h.ctx.clone());
        let text = "word ".repeat(40);

        board.submit(&mut draft("A", "B", &text)).await.unwrap();

        let summary = board.testimonials()[0].summary_am.clone().unwrap();
        assert!(summary.chars().count() <= 100);
        assert!(text.starts_with(&summary));
    }

    #[tokio::test]
    async fn test_empty_field_makes_no_remote_call() {
        let mut h = Harness::new();
        let mut board = TestimonialBoard::new(h.ctx.clone());

        assert!(board.submit(&mut draft("Ani", "", "text")).await.is_err());
        assert!(h.backend.calls().await.is_empty());
        assert!(board.testimonials().is_empty());
        assert_eq!(
            h.drain(),
            vec![Notice::failure("Please fill in all required fields.")]
        );
    }

    #[tokio::test]
    async fn test_insert_failure_keeps_list_and_form() {
        let mut h = Harness::new();
        let mut board = TestimonialBoard::new(h.ctx.clone());
        h.backend
            .set_faults(Faults {
                insert: Some("insert denied".into()),
                ..Faults::default()
            })
            .await;

        let mut form = draft("Ani", "Nurse", "Great care.");
        assert!(board.submit(&mut form).await.is_err());
        assert!(board.testimonials().is_empty());
        assert_eq!(form.author, "Ani");
        assert_eq!(h.drain(), vec![Notice::failure("Sending failed: insert denied")]);
    }

    #[tokio::test]
    async fn test_only_admin_deletes() {
        let h = Harness::new();
        let row = h
            .backend
            .seed(TESTIMONIALS_TABLE, json!({ "author": "Ani", "fullText_am": "t", "is_new": true }))
            .await;
        let id = row["id"].as_i64().unwrap();
        let mut board = TestimonialBoard::new(h.ctx.clone());
        board.load().await.unwrap();
        h.backend.clear_calls().await;

        assert!(!board.can_delete());
        assert!(matches!(board.remove(id).await, Err(AppError::Unauthorized(_))));
        assert!(h.backend.calls().await.is_empty());
        assert_eq!(board.testimonials().len(), 1);

        h.ctx
            .session
            .sign_in(crate::records::test_support::ADMIN, crate::records::test_support::PASSWORD)
            .await
            .unwrap();
        board.remove(id).await.unwrap();
        assert!(board.testimonials().is_empty());
        assert!(h.backend.rows(TESTIMONIALS_TABLE).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_list() {
        let mut h = Harness::admin().await;
        let row = h
            .backend
            .seed(TESTIMONIALS_TABLE, json!({ "author": "Ani", "fullText_am": "t", "is_new": true }))
            .await;
        let mut board = TestimonialBoard::new(h.ctx.clone());
        board.load().await.unwrap();
        h.backend
            .set_faults(Faults {
                delete: Some("denied".into()),
                ..Faults::default()
            })
            .await;

        assert!(board.remove(row["id"].as_i64().unwrap()).await.is_err());
        assert_eq!(board.testimonials().len(), 1);
        assert!(h
            .backend
            .calls()
            .await
            .iter()
            .any(|c| matches!(c, Call::Delete { .. })));
        assert_eq!(
            h.drain(),
            vec![Notice::failure("Deleting the testimonial failed: denied")]
        );
    }

    #[tokio::test]
    async fn test_cards_follow_language() {
        let h = Harness::new();
        h.backend
            .seed(
                TESTIMONIALS_TABLE,
                json!({
                    "author": "Ani",
                    "role_am": "Բուժքույր",
                    "role_en": "Nurse",
                    "summary_en": "Great care",
                    "fullText_am": "Հիանալի խնամք",
                    "is_new": true,
                    "created_at": "2024-03-05T10:00:00+00:00"
                }),
            )
            .await;
        h.backend
            .seed(
                TESTIMONIALS_TABLE,
                json!({ "author": "Blank", "is_new": true, "created_at": "2024-01-01T00:00:00+00:00" }),
            )
            .await;
        let mut board = TestimonialBoard::new(h.ctx.clone());
        board.load().await.unwrap();

        let cards = board.cards();
        assert_eq!(cards[0].role, "Nurse");
        assert_eq!(cards[0].summary, "\"Great care...\"");
        assert_eq!(cards[0].full_text.as_deref(), Some("Հիանալի խնամք"));
        assert_eq!(cards[0].posted_on, "March 5, 2024");
        assert_eq!(cards[1].summary, "No testimonial text");
        assert!(cards[1].full_text.is_none());

        h.ctx.i18n.set_language(Language::Am);
        let cards = board.cards();
        assert_eq!(cards[0].role, "Բուժքույր");
        assert_eq!(cards[0].summary, "\"Հիանալի խնամք...\"");
        assert_eq!(cards[0].posted_on, "5 մարտի 2024 թ.");
    }
}
