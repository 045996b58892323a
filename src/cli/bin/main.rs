// Macros
#[macro_use]
extern crate clap;

// Std
use std::time::Duration;

// Crates
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{App, Arg, ArgMatches};
use tracing::info;

// Local
use designboard::dashboard::render_header;
use designboard::form::parse_date;
use designboard::telemetry::{get_subscriber, init_subscriber};
use designboard::{
    clock::Clock, ConsoleNotifier, Dashboard, EntryForm, FileSlots, SortDirection, SortField,
    SortState,
};

type FileDashboard = Dashboard<FileSlots, ConsoleNotifier>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let subscriber = get_subscriber("designboard".into(), "warn".into(), std::io::stderr);
    init_subscriber(subscriber)?;

    let matches = App::new("designboard")
        .version(crate_version!())
        .about("Log design work and see what it adds up to.")
        .arg(
            Arg::with_name("entry")
                .short("e")
                .long("entry")
                .value_names(&["name", "work_type", "date", "company", "amount"])
                .help("Add a work entry. Date is YYYY-MM-DD, today, yesterday or tomorrow.")
                .takes_value(true)
                .value_delimiter("|"),
        )
        .arg(
            Arg::with_name("delete")
                .short("d")
                .long("delete")
                .takes_value(true)
                .value_name("id")
                .help("Delete the work entry with this id."),
        )
        .arg(
            Arg::with_name("list")
                .short("l")
                .long("list")
                .help("Print the work entries table."),
        )
        .arg(
            Arg::with_name("sort")
                .long("sort")
                .takes_value(true)
                .value_name("field")
                .possible_values(&["designer", "date", "company", "amount"])
                .help("Use with '-l'. Column to sort by."),
        )
        .arg(
            Arg::with_name("desc")
                .long("desc")
                .conflicts_with("asc")
                .help("Use with '--sort'. Sort descending."),
        )
        .arg(
            Arg::with_name("asc")
                .long("asc")
                .help("Use with '--sort'. Sort ascending."),
        )
        .arg(
            Arg::with_name("stats")
                .short("s")
                .long("stats")
                .help("Print today's, this month's and overall figures."),
        )
        .arg(
            Arg::with_name("graphs")
                .short("g")
                .long("graphs")
                .help("Print the last 7 days and month-to-date charts."),
        )
        .arg(
            Arg::with_name("list_companies")
                .short("p")
                .long("list-companies")
                .help("List all selectable companies."),
        )
        .arg(
            Arg::with_name("add_company")
                .short("a")
                .long("add-company")
                .takes_value(true)
                .value_name("name")
                .help("Add a new company."),
        )
        .arg(
            Arg::with_name("find_company")
                .long("find-company")
                .takes_value(true)
                .value_name("query")
                .help("Search companies by name."),
        )
        .arg(
            Arg::with_name("watch")
                .short("w")
                .long("watch")
                .help("Show a live clock header until Ctrl-C."),
        )
        .get_matches();

    let slots = FileSlots::from_env();
    info!(dir = %slots.dir().display(), "opening dashboard");
    let mut dash = Dashboard::open(slots, ConsoleNotifier);
    let mut handled = false;

    if let Some(values) = matches.values_of("entry") {
        add_entry(&mut dash, values.collect())?;
        handled = true;
    }

    if let Some(id) = matches.value_of("delete") {
        dash.delete(id)?;
        handled = true;
    }

    if let Some(name) = matches.value_of("add_company") {
        dash.add_company(name)?;
        handled = true;
    }

    if matches.is_present("list_companies") {
        let all: Vec<_> = dash.companies().all().iter().collect();
        print!("{}", dash.render_companies(&all));
        handled = true;
    }

    if let Some(query) = matches.value_of("find_company") {
        let found = dash.companies().search(query);
        if found.is_empty() {
            println!("No company found.");
        } else {
            print!("{}", dash.render_companies(&found));
        }
        handled = true;
    }

    let now = Local::now();

    if matches.is_present("stats") {
        print!("{}", dash.render_stats(now));
        handled = true;
    }

    if matches.is_present("list") {
        print!("{}", dash.render_table(sort_state(&matches)?));
        handled = true;
    }

    if matches.is_present("graphs") {
        print!("{}", dash.render_daily_chart(now));
        print!("{}", dash.render_cumulative_chart(now));
        handled = true;
    }

    if matches.is_present("watch") {
        watch().await?;
        handled = true;
    }

    if !handled {
        print!("{}", dash.render(now, sort_state(&matches)?));
    }

    Ok(())
}

fn add_entry(dash: &mut FileDashboard, values: Vec<&str>) -> Result<()> {
    if values.len() != 5 {
        return Err(anyhow!(
            "--entry takes name|work_type|date|company|amount, got {} values",
            values.len()
        ));
    }

    let now = Local::now();
    let date = match parse_date(values[2], now.date_naive()) {
        Ok(date) => Some(date),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    };

    let form = EntryForm {
        designer_name: values[0].to_string(),
        work_type: values[1].to_string(),
        date,
        company: resolve_company(dash, values[3]),
        amount: values[4].to_string(),
    };

    if let Some(entry) = dash.submit(&form, now)? {
        println!("Id: {}", entry.id);
    }
    Ok(())
}

// Accept either a company value or its label.
fn resolve_company(dash: &FileDashboard, raw: &str) -> String {
    let companies = dash.companies();
    if companies.find(raw.trim()).is_some() {
        return raw.trim().to_string();
    }
    companies
        .all()
        .iter()
        .find(|c| c.label.eq_ignore_ascii_case(raw.trim()))
        .map(|c| c.value.clone())
        .unwrap_or_else(|| raw.trim().to_string())
}

fn sort_state(matches: &ArgMatches) -> Result<SortState> {
    let mut state = SortState::default();
    if let Some(field) = matches.value_of("sort") {
        let field: SortField = field.parse().context("invalid --sort value")?;
        state = SortState {
            field,
            direction: SortDirection::Asc,
        };
    }
    if matches.is_present("desc") {
        state.direction = SortDirection::Desc;
    } else if matches.is_present("asc") {
        state.direction = SortDirection::Asc;
    }
    Ok(state)
}

async fn watch() -> Result<()> {
    let clock = Clock::start(Duration::from_secs(1), |now| {
        // Clear the screen and redraw from the top-left corner.
        print!("\x1B[2J\x1B[H{}", render_header(now));
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    clock.stop();
    println!();
    Ok(())
}
