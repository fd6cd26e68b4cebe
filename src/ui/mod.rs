/// Screen renderers
///
/// Each screen is a plain function from borrowed state to an `Element`;
/// all state lives in the app and the scanner.

pub mod collection;
pub mod map;
pub mod notes;
pub mod scan;
pub mod thumbnail;

use chrono::{DateTime, Local, Utc};
use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Element, Length, Theme};

use crate::app::Message;
use crate::state::data::Artifact;
use crate::state::screen::{NavItem, Transition};

/// Title bar shown above every screen
pub fn header<'a>() -> Element<'a, Message> {
    container(text("📸 Artifact Scanner").size(26))
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(14)
        .style(container::dark)
        .into()
}

/// Two-item navigation bar
pub fn nav_bar<'a>(active: NavItem) -> Element<'a, Message> {
    let item = |label: &'a str, target: NavItem, transition: Transition| {
        let style: fn(&Theme, button::Status) -> button::Style = if active == target {
            button::primary
        } else {
            button::text
        };

        button(
            container(text(label).size(14))
                .width(Length::Fill)
                .center_x(Length::Fill),
        )
        .on_press(Message::Navigate(transition))
        .width(Length::Fill)
        .padding(14)
        .style(style)
    };

    row![
        item("📷 Scan", NavItem::Scan, Transition::ShowScan),
        item("🗃 Collection", NavItem::Collection, Transition::ShowCollection),
    ]
    .spacing(4)
    .width(Length::Fill)
    .into()
}

/// Title row of the Map and Notes screens, with a close button
pub fn detail_header<'a>(title: String) -> Element<'a, Message> {
    row![
        text(title).size(22).width(Length::Fill),
        button(text("✕"))
            .on_press(Message::Navigate(Transition::Close))
            .style(button::text),
    ]
    .align_y(Alignment::Center)
    .padding(12)
    .into()
}

/// Placeholder for screens with nothing to show
pub fn empty_state<'a>(title: &'a str, hint: &'a str) -> Element<'a, Message> {
    container(
        column![text(title).size(20), text(hint).size(14)]
            .spacing(8)
            .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .center_x(Length::Fill)
    .padding(60)
    .into()
}

/// Capture instant in the local time zone
pub fn local_datetime(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn local_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Coordinates to 4 decimals, or the given fallback
pub fn location_label(artifact: &Artifact, fallback: &str) -> String {
    artifact
        .location
        .map(|l| l.short_label())
        .unwrap_or_else(|| fallback.to_string())
}
