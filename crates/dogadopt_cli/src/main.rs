//! Operator CLI for the shelter database.
//!
//! # Responsibility
//! - Wire config, logging, storage and services from `dogadopt_core`.
//! - Keep output line-oriented for scripting.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dogadopt_core::{
    Adopter, AdopterService, AdoptionApplication, AdoptionApplicationService, Breed, BreedService,
    Connection, CoreConfig, Dog, DogService, EntityId, PhotoGateway, Query, Repository,
    Sex, SqlRecord, SqliteRepository,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dogadopt", version, about = "Dog adoption shelter records")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides `[database] path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print record counts per kind.
    Summary,
    /// Insert a small demo data set.
    Seed,
    /// Mark a dog as adopted.
    Adopt { dog_id: EntityId },
    /// Print random dog photos.
    Photo {
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }
    config.init_logging().context("failed to start logging")?;

    match cli.command {
        Command::Summary => summary(&config.open_database()?),
        Command::Seed => seed(&config.open_database()?),
        Command::Adopt { dog_id } => adopt(&config.open_database()?, dog_id),
        Command::Photo { count } => photo(&config, count),
    }
}

fn count<T: SqlRecord>(conn: &Connection) -> Result<usize> {
    let repo = SqliteRepository::<T>::try_new(conn)?;
    Ok(repo.get_all(&Query::new().select(|_| ()))?.len())
}

fn summary(conn: &Connection) -> Result<()> {
    let dogs = SqliteRepository::<Dog>::try_new(conn)?;
    let available = dogs
        .get_all(&Query::new().filter(|dog: &Dog| !dog.is_adopted()).select(|_| ()))?
        .len();

    println!("breeds={}", count::<Breed>(conn)?);
    println!("dogs={} not_adopted={available}", count::<Dog>(conn)?);
    println!("adopters={}", count::<Adopter>(conn)?);
    println!("applications={}", count::<AdoptionApplication>(conn)?);
    Ok(())
}

fn seed(conn: &Connection) -> Result<()> {
    let breeds = BreedService::new(SqliteRepository::try_new(conn)?);
    let dogs = DogService::new(SqliteRepository::try_new(conn)?);
    let adopters = AdopterService::new(SqliteRepository::try_new(conn)?);
    let applications = AdoptionApplicationService::new(SqliteRepository::try_new(conn)?);

    let stored_breeds = breeds.insert_many(vec![Breed::new("Labrador"), Breed::new("Beagle")])?;
    let (labrador, beagle) = (stored_breeds[0].id, stored_breeds[1].id);

    let stored_dogs = dogs.insert_many(vec![
        Dog::new("Rex", 3, Sex::M, labrador),
        Dog::new("Daisy", 1, Sex::F, beagle),
        Dog::new("Milo", 5, Sex::M, beagle),
    ])?;
    let adopter = adopters.add(Adopter::new("Ana Silva", "ana@example.com").with_phone("555-0100"))?;
    let application = applications.add(
        AdoptionApplication::new(stored_dogs[0].id, adopter.id).with_notes("Has a fenced yard"),
    )?;

    info!(
        "event=seed module=cli status=ok breeds={} dogs={}",
        stored_breeds.len(),
        stored_dogs.len()
    );
    for dog in &stored_dogs {
        println!("dog {} {}", dog.id, dog.name);
    }
    println!("adopter {} {}", adopter.id, adopter.full_name);
    println!("application {} {}", application.id, application.status);
    Ok(())
}

fn adopt(conn: &Connection, dog_id: EntityId) -> Result<()> {
    let dogs = DogService::new(SqliteRepository::try_new(conn)?);
    let dog = dogs
        .mark_as_adopted(dog_id)
        .with_context(|| format!("cannot mark dog {dog_id} as adopted"))?;
    info!("event=dog_adopted module=cli status=ok dog_id={}", dog.id);
    println!("{} {} status={}", dog.id, dog.name, dog.status);
    Ok(())
}

fn photo(config: &CoreConfig, count: u32) -> Result<()> {
    let gateway = config.photo_gateway()?;
    let photos = if count <= 1 {
        gateway.get_random().map(|photo| vec![photo])
    } else {
        gateway.get_random_many(count)
    };

    match photos {
        Ok(photos) => {
            for photo in photos {
                println!(
                    "{} breed={} sub_breed={} provider={}",
                    photo.image_url, photo.breed, photo.sub_breed, photo.provider
                );
            }
        }
        Err(err) => eprintln!("photo unavailable: {err}"),
    }
    Ok(())
}
