use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use orecart_core::transit::{AdaRequest, Alert, PickupSpot, RidershipRecord, Route, Stop, Van};

/// Prints either a short human summary per item or the raw JSON.
pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn list<T: Serialize + Summary>(&self, items: &[T]) -> Result<()> {
        if self.json {
            return self.json(&items);
        }

        for item in items {
            println!("{}", item.summary());
        }
        log::info!("{} item(s)", items.len());

        Ok(())
    }

    pub fn one<T: Serialize + Summary>(&self, item: &T) -> Result<()> {
        if self.json {
            return self.json(item);
        }

        println!("{}", item.summary());
        Ok(())
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
        println!("{text}");
        Ok(())
    }

    pub fn line(&self, text: impl std::fmt::Display) {
        println!("{text}");
    }
}

pub trait Summary {
    fn summary(&self) -> String;
}

pub fn format_time(unix_seconds: i64) -> String {
    match DateTime::from_timestamp(unix_seconds, 0) {
        Some(time) => time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => format!("@{unix_seconds}"),
    }
}

fn active_marker(active: bool) -> &'static str {
    if active { "" } else { " (inactive)" }
}

impl Summary for Route {
    fn summary(&self) -> String {
        format!(
            "{:>4}  {}{}  {} stops  {}",
            self.id,
            self.name,
            active_marker(self.is_active),
            self.stop_ids.len(),
            self.color.as_deref().unwrap_or("-"),
        )
    }
}

impl Summary for Stop {
    fn summary(&self) -> String {
        let routes: Vec<String> = self.route_ids.iter().map(|id| id.to_string()).collect();
        let location = match self.location {
            Some(location) => format!("({:.5}, {:.5})", location.latitude, location.longitude),
            None => "(no location)".to_string(),
        };
        format!(
            "{:>4}  {}{}  {location}  routes [{}]",
            self.id,
            self.name,
            active_marker(self.is_active),
            routes.join(", "),
        )
    }
}

impl Summary for Alert {
    fn summary(&self) -> String {
        format!(
            "{:>4}  {} -> {}  {}",
            self.id,
            format_time(self.start_date_time),
            format_time(self.end_date_time),
            self.text,
        )
    }
}

impl Summary for Van {
    fn summary(&self) -> String {
        let access = if self.wheelchair { "  wheelchair" } else { "" };
        format!("{:>4}  route {}{access}", self.van_id, self.route_id)
    }
}

impl Summary for PickupSpot {
    fn summary(&self) -> String {
        format!(
            "{:>4}  {}  ({:.5}, {:.5})",
            self.id, self.name, self.latitude, self.longitude
        )
    }
}

impl Summary for AdaRequest {
    fn summary(&self) -> String {
        let spot = self.pickup_spot.as_ref().map(|spot| spot.name.as_str()).unwrap_or("?");
        let access = if self.wheelchair { "  wheelchair" } else { "" };
        format!("{:>4}  {}  at {spot}{access}", self.id, format_time(self.pickup_time))
    }
}

impl Summary for RidershipRecord {
    fn summary(&self) -> String {
        format!(
            "{}  van {} route {}  +{} -{}",
            format_time(self.datetime),
            self.van_id,
            self.route_id,
            self.entered,
            self.exited,
        )
    }
}

#[cfg(test)]
mod tests {
    use orecart_core::transit::{RouteId, VanId};

    use super::*;

    #[test]
    fn test_van_summary() {
        let van = Van {
            van_id: VanId::new(3),
            route_id: RouteId::new(1),
            wheelchair: true,
        };

        assert_eq!(van.summary(), "   3  route 1  wheelchair");
    }

    #[test]
    fn test_out_of_range_time() {
        assert_eq!(format_time(i64::MAX), format!("@{}", i64::MAX));
    }
}
