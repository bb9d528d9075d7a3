//! Keyword topic buckets.
//!
//! A review belongs to a topic when any of its tokens starts with one of the
//! topic's stems. Stems are prefixes so Russian inflections (`вылетает`,
//! `вылеты`, `вылетело`) land in the same bucket.

use revdash_core::Review;

use crate::text::tokenize;
use crate::types::TopicGroup;

const MAX_EXAMPLES: usize = 3;

struct Topic {
    id: &'static str,
    label: &'static str,
    stems: &'static [&'static str],
}

const TOPICS: &[Topic] = &[
    Topic {
        id: "crashes_bugs",
        label: "Crashes and bugs",
        stems: &[
            "crash", "bug", "freez", "error", "broken", "glitch", "вылет", "краш", "баг",
            "ошибк", "глюк", "завис", "сбой", "сбои", "сбоя", "слома",
        ],
    },
    Topic {
        id: "performance",
        label: "Performance",
        stems: &[
            "slow", "lag", "speed", "battery", "perform", "медлен", "тормоз", "долго", "загруж",
            "батаре", "лаг",
        ],
    },
    Topic {
        id: "login_account",
        label: "Login and account",
        stems: &[
            "login", "logout", "password", "account", "signin", "auth", "вход", "войти", "логин",
            "пароль", "парол", "аккаунт", "авториз", "регистрац", "смс",
        ],
    },
    Topic {
        id: "payments_pricing",
        label: "Payments and pricing",
        stems: &[
            "pay", "price", "subscri", "refund", "money", "charg", "expensive", "оплат", "платеж",
            "платн", "цена", "цены", "цену", "подписк", "деньг", "дорог", "возврат", "списа",
        ],
    },
    Topic {
        id: "ads",
        label: "Ads",
        stems: &["ads", "advert", "banner", "реклам", "баннер"],
    },
    Topic {
        id: "ui_design",
        label: "Interface and design",
        stems: &[
            "interface", "design", "button", "menu", "theme", "font", "layout", "интерфейс",
            "дизайн", "кнопк", "меню", "шрифт", "удобн", "неудобн",
        ],
    },
    Topic {
        id: "updates",
        label: "Updates",
        stems: &["update", "version", "upgrade", "обновл", "верси", "апдейт"],
    },
    Topic {
        id: "support",
        label: "Support",
        stems: &[
            "support", "helpdesk", "customer", "поддержк", "техподдерж", "служб", "оператор",
        ],
    },
];

/// Buckets reviews into fixed keyword topics.
///
/// Topics nobody mentioned are omitted. The rest are sorted by count
/// descending, ties keeping the fixed topic order.
#[must_use]
pub fn group_topics(reviews: &[Review]) -> Vec<TopicGroup> {
    let mut groups: Vec<TopicGroup> = TOPICS
        .iter()
        .map(|topic| TopicGroup {
            topic: topic.id.to_owned(),
            label: topic.label.to_owned(),
            count: 0,
            example_ids: Vec::new(),
        })
        .collect();

    for review in reviews {
        let tokens = tokenize(&review.full_text());
        for (topic, group) in TOPICS.iter().zip(groups.iter_mut()) {
            let mentioned = tokens
                .iter()
                .any(|token| topic.stems.iter().any(|stem| token.starts_with(stem)));
            if mentioned {
                group.count += 1;
                if group.example_ids.len() < MAX_EXAMPLES {
                    group.example_ids.push(review.id.clone());
                }
            }
        }
    }

    groups.retain(|g| g.count > 0);
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}
