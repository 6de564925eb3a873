#[macro_use]
extern crate log;

use clap::{App, AppSettings, Arg, ArgMatches};
use higgsprod::couplings::CouplingSet;
use higgsprod::pdf::make_pdf;
use higgsprod::{Error, Integrand, Integrator, IntegratorSettings, Process, Result, RunCard};
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;

const APPNAME: &str = "higgsprod";

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T> {
    T::from_str(value).map_err(|_| Error::InvalidArgument {
        name: name.to_owned(),
        value: value.to_owned(),
    })
}

fn required<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    let value = matches
        .value_of(name)
        .ok_or_else(|| Error::Usage(format!("missing <{}>", name)))?;
    parse_value(name, value)
}

/// Run card from `--card`, overridden by the command line options.
fn run_card(matches: &ArgMatches) -> Result<RunCard> {
    let mut card = match matches.value_of("card") {
        Some(path) => RunCard::from_file(path)?,
        None => RunCard::default(),
    };

    if let Some(x) = matches.value_of("iterations") {
        card.n_iterations = parse_value("iterations", x)?;
    }
    if let Some(x) = matches.value_of("cores") {
        card.cores = parse_value("cores", x)?;
    }
    if let Some(x) = matches.value_of("seed") {
        card.seed = parse_value("seed", x)?;
    }
    if let Some(x) = matches.value_of("process") {
        card.process = Process::from_str(x)?;
    }
    if let Some(x) = matches.value_of("pdf") {
        card.pdf_set = x.to_owned();
    }

    card.validate()?;
    Ok(card)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let mass: f64 = required(matches, "mass")?;
    let tan_beta: f64 = required(matches, "tan_beta")?;
    let cos_alpha_beta: f64 = required(matches, "cos_alpha_beta")?;
    let card = run_card(matches)?;

    info!("{}", card.process);
    info!("E_{{CM}} = {} TeV", card.collider_energy / 1000.);
    info!("m_H = {} GeV", mass);
    info!("tan(beta) = {}, cos(alpha-beta) = {}", tan_beta, cos_alpha_beta);

    let pdf = make_pdf(&card.pdf_set, card.alphas_mz)?;
    info!("PDF set: {}", pdf.name());

    let couplings = CouplingSet::new(tan_beta, cos_alpha_beta)?;
    let integrand = Integrand::new(mass, couplings, &card, pdf.as_ref())?;

    if let Some(values) = matches.values_of("inspect") {
        let x = values
            .map(|v| parse_value("inspect", v))
            .collect::<Result<Vec<f64>>>()?;
        print!("{}", integrand.inspect(&x)?);
        return Ok(());
    }

    let mut integrator = Integrator::new(integrand, IntegratorSettings::from(&card))?;
    let result = integrator.run()?;

    info!("... done.");
    println!(
        "total cross section = {:.9} +- {:.9} pb",
        result.cross_section, result.error
    );

    if let Some(output) = matches.value_of("output") {
        let mut f = OpenOptions::new().create(true).append(true).open(output)?;
        writeln!(f, "{}", result.to_row(mass))?;
        info!("the output has been saved to `{}'.", output);
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new(APPNAME)
        .version("0.1")
        .about("Cross section of a neutral scalar in p p collisions")
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(Arg::with_name("mass").required(true).help("Scalar mass in GeV"))
        .arg(Arg::with_name("tan_beta").required(true).help("tan(beta)"))
        .arg(
            Arg::with_name("cos_alpha_beta")
                .required(true)
                .help("cos(alpha-beta)"),
        )
        .arg(
            Arg::with_name("output")
                .help("Append `mass  cross_section  error` to this file"),
        )
        .arg(
            Arg::with_name("card")
                .long("card")
                .value_name("RUNCARD")
                .help("YAML run card"),
        )
        .arg(
            Arg::with_name("iterations")
                .short("n")
                .long("iterations")
                .value_name("N")
                .help("Number of Monte Carlo points"),
        )
        .arg(
            Arg::with_name("cores")
                .short("c")
                .long("cores")
                .value_name("NUMCORES")
                .help("Set the number of cores"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("Specify the integration seed"),
        )
        .arg(
            Arg::with_name("process")
                .long("process")
                .value_name("PROCESS")
                .possible_values(&["resonant", "associated", "charged"])
                .help("Production process"),
        )
        .arg(
            Arg::with_name("pdf")
                .long("pdf")
                .value_name("PDFSET")
                .help("'toy' or an LHAPDF set name"),
        )
        .arg(
            Arg::with_name("inspect")
                .long("inspect")
                .value_name("X")
                .use_delimiter(true)
                .require_delimiter(true)
                .help("Inspect a single comma-separated input point instead of integrating"),
        )
        .get_matches_safe();

    let matches = match matches {
        Ok(m) => m,
        Err(e) if e.use_stderr() => {
            eprintln!("{}", e.message);
            std::process::exit(1);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    if let Err(e) = run(&matches) {
        error!("{}", e);
        std::process::exit(match e {
            Error::Usage(_) | Error::InvalidArgument { .. } => 1,
            _ => 2,
        });
    }
}
