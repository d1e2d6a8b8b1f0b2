use anyhow::{bail, Context, Result};
use chrono::DateTime;

use orecart_core::api_types::{AdaRequestBody, AlertBody, PickupSpotBody, VanBody};
use orecart_core::feed::{Feed, VanFilter};
use orecart_core::subscription::Subscription;
use orecart_core::transit::spatial::{format_miles, format_seconds_as_minutes, geo_distance_to_miles};
use orecart_core::transit::{
    AlertId, Coordinate, PickupSpotId, RouteId, StopId, TransitDirectory, VanId,
};
use orecart_core::{OreCartClient, Query};

use crate::output::{Printer, Summary};
use crate::{AdaCommand, AlertCommand, Command, VanCommand, WatchCommand};

/// Parse an RFC 3339 timestamp into Unix seconds.
fn parse_time(value: &str) -> Result<i64> {
    let time = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Expected an RFC 3339 time, got {value:?}"))?;
    Ok(time.timestamp())
}

fn alert_body(text: String, start: &str, end: &str) -> Result<AlertBody> {
    let start_time = parse_time(start)?;
    let end_time = parse_time(end)?;
    if end_time < start_time {
        bail!("Alert ends before it starts");
    }

    Ok(AlertBody {
        text,
        start_time,
        end_time,
    })
}

pub async fn run(client: &OreCartClient, out: &Printer, command: Command) -> Result<()> {
    let api = client.api();

    match command {
        Command::Login { username, password } => {
            api.login(&username, &password).await.context("Login failed")?;
            out.line(format!("Logged in as {username}"));
        }
        Command::Logout => {
            api.logout().await?;
            out.line("Logged out");
        }
        Command::Whoami => {
            let valid = api.check_auth().await.context("Failed to check session")?;
            out.line(if valid { "Session is valid" } else { "Not logged in" });
        }

        Command::Routes { id: Some(id) } => out.one(&api.route(RouteId::new(id)).await?)?,
        Command::Routes { id: None } => out.list(&api.routes().await?)?,
        Command::RouteStops { id } => out.list(&api.route_stops(RouteId::new(id)).await?)?,
        Command::Kml { output } => {
            let kml = api.routes_kml().await.context("Failed to export KML")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, kml)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Wrote {}", path.display());
                }
                None => out.line(kml),
            }
        }
        Command::ClearRoutes { yes } => {
            if !yes {
                bail!("Refusing to delete every route without --yes");
            }
            api.clear_routes().await?;
            out.line("Cleared all routes");
        }

        Command::Stops { id: Some(id) } => out.one(&api.stop(StopId::new(id)).await?)?,
        Command::Stops { id: None } => out.list(&api.stops().await?)?,
        Command::Nearest {
            latitude,
            longitude,
        } => {
            let here = Coordinate::validated(latitude, longitude)?;
            let directory: TransitDirectory = client.directory().await?;

            match directory.nearest_stop(here, true) {
                Some(nearest) => {
                    let miles = geo_distance_to_miles(nearest.distance);
                    out.line(format!("{}  {}", nearest.inner.summary(), format_miles(miles)));
                }
                None => out.line("No active stops"),
            }
        }

        Command::Alerts(command) => run_alerts(client, out, command).await?,
        Command::Vans(command) => run_vans(client, out, command).await?,
        Command::Ada(command) => run_ada(client, out, command).await?,
        Command::Ridership => out.list(&api.ridership().await?)?,
        Command::Watch(command) => run_watch(client, out, command).await?,
    }

    Ok(())
}

async fn run_alerts(client: &OreCartClient, out: &Printer, command: AlertCommand) -> Result<()> {
    let api = client.api();

    match command {
        AlertCommand::List { filter } => out.list(&api.alerts(filter).await?)?,
        AlertCommand::Show { id } => out.one(&api.alert(AlertId::new(id)).await?)?,
        AlertCommand::Create { text, start, end } => {
            api.create_alert(&alert_body(text, &start, &end)?).await?;
            out.line("Alert created");
        }
        AlertCommand::Update {
            id,
            text,
            start,
            end,
        } => {
            api.update_alert(AlertId::new(id), &alert_body(text, &start, &end)?)
                .await?;
            out.line(format!("Alert {id} updated"));
        }
        AlertCommand::Delete { id } => {
            api.delete_alert(AlertId::new(id)).await?;
            out.line(format!("Alert {id} deleted"));
        }
    }

    Ok(())
}

async fn run_vans(client: &OreCartClient, out: &Printer, command: VanCommand) -> Result<()> {
    let api = client.api();

    match command {
        VanCommand::List => out.list(&api.vans().await?)?,
        VanCommand::Show { id } => out.one(&api.van(VanId::new(id)).await?)?,
        VanCommand::Create {
            route_id,
            wheelchair,
        } => {
            let body = VanBody {
                route_id: RouteId::new(route_id),
                wheelchair,
            };
            api.create_van(&body).await?;
            out.line("Van created");
        }
        VanCommand::Update {
            id,
            route_id,
            wheelchair,
        } => {
            let body = VanBody {
                route_id: RouteId::new(route_id),
                wheelchair,
            };
            api.update_van(VanId::new(id), &body).await?;
            out.line(format!("Van {id} updated"));
        }
        VanCommand::Delete { id } => {
            api.delete_van(VanId::new(id)).await?;
            out.line(format!("Van {id} deleted"));
        }
    }

    Ok(())
}

async fn run_ada(client: &OreCartClient, out: &Printer, command: AdaCommand) -> Result<()> {
    let api = client.api();

    match command {
        AdaCommand::Spots => out.list(&api.pickup_spots().await?)?,
        AdaCommand::AddSpot {
            name,
            latitude,
            longitude,
        } => {
            Coordinate::validated(latitude, longitude)?;
            let body = PickupSpotBody {
                name,
                latitude,
                longitude,
            };
            api.create_pickup_spot(&body).await?;
            out.line("Pickup spot created");
        }
        AdaCommand::UpdateSpot {
            id,
            name,
            latitude,
            longitude,
        } => {
            Coordinate::validated(latitude, longitude)?;
            let body = PickupSpotBody {
                name,
                latitude,
                longitude,
            };
            api.update_pickup_spot(PickupSpotId::new(id), &body).await?;
            out.line(format!("Pickup spot {id} updated"));
        }
        AdaCommand::DeleteSpot { id } => {
            api.delete_pickup_spot(PickupSpotId::new(id)).await?;
            out.line(format!("Pickup spot {id} deleted"));
        }
        AdaCommand::Requests { filter } => out.list(&api.ada_requests(filter).await?)?,
        AdaCommand::Request {
            spot_id,
            time,
            wheelchair,
        } => {
            let pickup_time = parse_time(&time)?;
            if pickup_time <= chrono::Utc::now().timestamp() {
                bail!("Pickup time must be in the future");
            }

            let body = AdaRequestBody {
                pickup_spot_id: PickupSpotId::new(spot_id),
                pickup_time,
                wheelchair,
            };
            api.create_ada_request(&body).await?;
            out.line("Pickup requested");
        }
    }

    Ok(())
}

async fn run_watch(client: &OreCartClient, out: &Printer, command: WatchCommand) -> Result<()> {
    match command {
        WatchCommand::Arrivals {
            stop_id,
            route_id,
            count,
        } => {
            let subscription = client
                .arrival_estimate(StopId::new(stop_id), RouteId::new(route_id))
                .await?;

            follow(subscription, count, |query| match query {
                Query::Loading => "waiting for estimate".to_string(),
                Query::Success(Some(seconds)) => format!("next van in {}", format_seconds_as_minutes(seconds)),
                Query::Success(None) => "no van headed here".to_string(),
                Query::Error(message) => format!("error: {message}"),
            })
            .await
        }
        WatchCommand::Vans { route_ids, count } => {
            let filter = if route_ids.is_empty() {
                VanFilter::alive()
            } else {
                VanFilter::on_routes(route_ids.into_iter().map(RouteId::new))
            };
            let subscription = client.van_locations(filter).await?;
            let json = out.is_json();

            follow(subscription, count, move |query| match query {
                Query::Loading => "waiting for vans".to_string(),
                Query::Success(vans) if json => serde_json::to_string(&vans).unwrap_or_default(),
                Query::Success(vans) => {
                    let positions: Vec<String> = vans
                        .iter()
                        .map(|van| {
                            format!(
                                "van {} ({:.5}, {:.5})",
                                van.guid, van.location.latitude, van.location.longitude
                            )
                        })
                        .collect();
                    format!("{} van(s): {}", vans.len(), positions.join("; "))
                }
                Query::Error(message) => format!("error: {message}"),
            })
            .await
        }
    }
}

/// Print every change until `count` updates have been shown or Ctrl-C.
async fn follow<F, R>(mut subscription: Subscription<F>, count: Option<usize>, render: R) -> Result<()>
where
    F: Feed,
    R: Fn(Query<F::Value>) -> String,
{
    let mut shown = 0;
    let mut query = subscription.current();

    loop {
        // Loading is only the initial state; it doesn't count as an update
        if !query.is_loading() {
            shown += 1;
        }
        println!("{}", render(query));

        if count.is_some_and(|count| shown >= count) {
            return Ok(());
        }

        query = tokio::select! {
            changed = subscription.changed() => changed.context("Feed stopped")?,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        };
    }
}
