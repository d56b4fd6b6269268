//! "I want this wine / this tasting" write actions.

use crate::{
    catalog::Catalog,
    domain::TelegramId,
    model::{EventInterest, WineInterest},
    notify::Notification,
    route::InterestTarget,
};

pub const MSG_INTEREST_SENT: &str =
    "Спасибо за интерес! С Вами в ближайшее время свяжется наш администратор";
pub const MSG_INTEREST_FAILED: &str =
    "Не удалось отправить заявку. Пожалуйста, попробуйте позже.";

/// Notify the club that `who` is interested in `target`.
///
/// Never fails: the outcome is a notification for the visitor, and the
/// current screen stays as it is.
pub async fn express_interest(
    catalog: &Catalog,
    target: InterestTarget,
    who: TelegramId,
) -> Notification {
    let api = catalog.api();
    let result = match target {
        InterestTarget::Wine(wine_id) => {
            api.notify_wine_interest(&WineInterest {
                wine_id,
                telegram_id: who,
            })
            .await
        }
        InterestTarget::Event(event_id) => {
            api.notify_event_interest(&EventInterest {
                event_id,
                telegram_id: who,
            })
            .await
        }
    };

    match result {
        Ok(()) => {
            catalog.invalidate_interested(who).await;
            tracing::info!(?target, id = %who, "interest sent");
            Notification::success(MSG_INTEREST_SENT)
        }
        Err(e) => {
            tracing::warn!(?target, id = %who, "interest notification failed: {e}");
            Notification::error(e.api_detail().unwrap_or(MSG_INTEREST_FAILED))
        }
    }
}
