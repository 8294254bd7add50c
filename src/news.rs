use chrono::{Local, NaiveDateTime};
use rand::{seq::SliceRandom, Rng};
use serenity::utils::MessageBuilder;
use tracing::info;

use crate::discord::{Delivery, Notifier, WebhookTransport};

pub const SAMPLE_HEADLINES: [&str; 5] = [
    "🏀 Lakers defeat Warriors 112-108 in overtime thriller!",
    "⚽ Manchester United signs new striker in record deal",
    "🏈 NFL Draft 2024: Top prospects to watch this season",
    "⚾ World Series Game 7: Historic matchup tonight!",
    "🎾 Wimbledon Final: Upset victory shakes tennis world",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Stand-in for a real feed.
pub fn fetch_headline<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SAMPLE_HEADLINES
        .choose(rng)
        .copied()
        .unwrap_or(SAMPLE_HEADLINES[0])
}

pub fn compose_update(headline: &str, timestamp: NaiveDateTime) -> String {
    MessageBuilder::new()
        .push_bold("Sports News Update")
        .push(format!(" ({})", timestamp.format(TIMESTAMP_FORMAT)))
        .push_line("")
        .push(headline)
        .build()
}

/// Email delivery is not wired up yet; the content is only logged.
pub fn preview_email(content: &str) {
    info!("[EMAIL] Would send: {content}");
}

pub async fn send_notifications<T: WebhookTransport>(
    notifier: &Notifier<T>,
    content: &str,
) -> Delivery {
    preview_email(content);
    notifier.send(content).await
}

pub async fn run<T: WebhookTransport>(notifier: &Notifier<T>) -> Delivery {
    info!("🏆 Sports News Bot Starting...");
    info!("📡 Checking for news updates...");

    let headline = fetch_headline(&mut rand::thread_rng());
    let message = compose_update(headline, Local::now().naive_local());

    info!("📰 Found news: {headline}");
    info!("📤 Sending notifications...");
    let delivery = send_notifications(notifier, &message).await;
    info!("✅ Notifications sent successfully!");
    delivery
}
