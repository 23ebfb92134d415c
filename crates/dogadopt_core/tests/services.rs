use dogadopt_core::db::open_db_in_memory;
use dogadopt_core::model::dog::{DOG_STATUS_ADOPTED, DOG_STATUS_AVAILABLE, DOG_STATUS_RESERVED};
use dogadopt_core::{
    Adopter, AdopterService, AdoptionApplication, AdoptionApplicationService, Breed, BreedService,
    Dog, DogService, EntityId, EntityKind, RepoError, ServiceError, Sex, SqliteRepository,
};
use rusqlite::Connection;

struct Services<'conn> {
    breeds: BreedService<SqliteRepository<'conn, Breed>>,
    dogs: DogService<SqliteRepository<'conn, Dog>>,
    adopters: AdopterService<SqliteRepository<'conn, Adopter>>,
    applications: AdoptionApplicationService<SqliteRepository<'conn, AdoptionApplication>>,
}

fn services(conn: &Connection) -> Services<'_> {
    Services {
        breeds: BreedService::new(SqliteRepository::try_new(conn).unwrap()),
        dogs: DogService::new(SqliteRepository::try_new(conn).unwrap()),
        adopters: AdopterService::new(SqliteRepository::try_new(conn).unwrap()),
        applications: AdoptionApplicationService::new(SqliteRepository::try_new(conn).unwrap()),
    }
}

#[test]
fn get_all_on_empty_store_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);

    assert!(services.breeds.get_all().unwrap().is_empty());
    assert!(services.dogs.get_all().unwrap().is_empty());
    assert!(services.adopters.get_all().unwrap().is_empty());
    assert!(services.applications.get_all().unwrap().is_empty());
}

#[test]
fn add_assigns_identity_and_returns_breed_with_dog() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);

    let labrador = services.breeds.add(Breed::new("Labrador")).unwrap();
    assert!(!labrador.id.is_unset());

    let rex = services
        .dogs
        .add(Dog::new("Rex", 3, Sex::M, labrador.id))
        .unwrap();
    assert!(!rex.id.is_unset());
    assert_ne!(rex.id, labrador.id);

    let loaded = services.dogs.get_by_id(rex.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Rex");
    assert_eq!(loaded.status, DOG_STATUS_AVAILABLE);
    assert_eq!(loaded.breed.map(|breed| breed.name).as_deref(), Some("Labrador"));

    let loaded_breed = services.breeds.get_by_id(labrador.id).unwrap().unwrap();
    let dog_names: Vec<&str> = loaded_breed.dogs.iter().map(|dog| dog.name.as_str()).collect();
    assert_eq!(dog_names, vec!["Rex"]);
}

#[test]
fn add_keeps_caller_supplied_identity() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let id = EntityId::new();

    let stored = services.breeds.add(Breed::with_id(id, "Akita")).unwrap();
    assert_eq!(stored.id, id);
    assert!(services.breeds.get_by_id(id).unwrap().is_some());
}

#[test]
fn update_replaces_whole_record() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let beagle = services.breeds.add(Breed::new("Beagle")).unwrap();
    let akita = services.breeds.add(Breed::new("Akita")).unwrap();
    let daisy = services
        .dogs
        .add(Dog::new("Daisy", 1, Sex::F, beagle.id))
        .unwrap();

    let mut changed = daisy.clone();
    changed.name = "Daisy Mae".to_string();
    changed.age = 2;
    changed.breed_id = akita.id;
    changed.status = DOG_STATUS_RESERVED.to_string();
    let stored = services.dogs.update(changed).unwrap();
    assert_eq!(stored.revision, daisy.revision + 1);

    let loaded = services.dogs.get_by_id(daisy.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Daisy Mae");
    assert_eq!(loaded.age, 2);
    assert_eq!(loaded.status, DOG_STATUS_RESERVED);
    assert_eq!(loaded.breed.map(|breed| breed.id), Some(akita.id));
}

#[test]
fn stale_update_is_a_concurrency_conflict() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let adopter = services
        .adopters
        .add(Adopter::new("Ana Silva", "ana@example.com"))
        .unwrap();

    let mut first = adopter.clone();
    first.phone = Some("555-0100".to_string());
    services.adopters.update(first).unwrap();

    let mut second = adopter.clone();
    second.email = "ana.silva@example.com".to_string();
    match services.adopters.update(second) {
        Err(ServiceError::Concurrency { entity, id }) => {
            assert_eq!(entity, EntityKind::Adopter);
            assert_eq!(id, adopter.id);
        }
        other => panic!("expected concurrency conflict, got {other:?}"),
    }

    let loaded = services.adopters.get_by_id(adopter.id).unwrap().unwrap();
    assert_eq!(loaded.email, "ana@example.com");
    assert_eq!(loaded.phone.as_deref(), Some("555-0100"));
}

#[test]
fn update_of_deleted_record_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let akita = services.breeds.add(Breed::new("Akita")).unwrap();
    services.breeds.delete_by_id(akita.id).unwrap();

    let mut renamed = akita.clone();
    renamed.name = "Akita Inu".to_string();
    assert!(matches!(
        services.breeds.update(renamed),
        Err(ServiceError::NotFound {
            entity: EntityKind::Breed,
            id
        }) if id == akita.id
    ));
}

#[test]
fn update_with_blank_field_is_a_validation_failure() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let mut adopter = services
        .adopters
        .add(Adopter::new("Ana Silva", "ana@example.com"))
        .unwrap();

    adopter.email = String::new();
    assert!(matches!(
        services.adopters.update(adopter),
        Err(ServiceError::Repo(RepoError::Validation(_)))
    ));
}

#[test]
fn delete_by_id_removes_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let labrador = services.breeds.add(Breed::new("Labrador")).unwrap();
    let rex = services
        .dogs
        .add(Dog::new("Rex", 3, Sex::M, labrador.id))
        .unwrap();

    let removed = services.dogs.delete_by_id(rex.id).unwrap();
    assert_eq!(removed.id, rex.id);
    assert!(services.dogs.get_by_id(rex.id).unwrap().is_none());

    assert!(matches!(
        services.dogs.delete_by_id(rex.id),
        Err(ServiceError::NotFound {
            entity: EntityKind::Dog,
            ..
        })
    ));
}

#[test]
fn deleting_a_breed_cascades_to_its_dogs() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let labrador = services.breeds.add(Breed::new("Labrador")).unwrap();
    let rex = services
        .dogs
        .add(Dog::new("Rex", 3, Sex::M, labrador.id))
        .unwrap();

    services.breeds.delete_by_id(labrador.id).unwrap();
    assert!(services.dogs.get_by_id(rex.id).unwrap().is_none());
}

#[test]
fn insert_many_assigns_identities_and_persists_all() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);

    let breeds = services
        .breeds
        .insert_many(vec![Breed::new("Labrador"), Breed::new("Beagle")])
        .unwrap();
    assert_eq!(breeds.len(), 2);
    assert!(breeds.iter().all(|breed| !breed.id.is_unset()));
    assert_ne!(breeds[0].id, breeds[1].id);

    let names: Vec<String> = services
        .breeds
        .get_all()
        .unwrap()
        .into_iter()
        .map(|breed| breed.name)
        .collect();
    assert_eq!(names, vec!["Labrador", "Beagle"]);

    assert!(services.breeds.insert_many(Vec::new()).unwrap().is_empty());
}

#[test]
fn insert_many_failure_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let labrador = services.breeds.add(Breed::new("Labrador")).unwrap();

    let err = services
        .dogs
        .insert_many(vec![
            Dog::new("Rex", 3, Sex::M, labrador.id),
            Dog::new("Ghost", 2, Sex::F, EntityId::new()),
        ])
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Persistence(_))));
    assert!(services.dogs.get_all().unwrap().is_empty());
}

#[test]
fn mark_as_adopted_overwrites_any_status_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let labrador = services.breeds.add(Breed::new("Labrador")).unwrap();
    let mut rex = Dog::new("Rex", 3, Sex::M, labrador.id);
    rex.status = "Quarantined".to_string();
    let rex = services.dogs.add(rex).unwrap();

    let adopted = services.dogs.mark_as_adopted(rex.id).unwrap();
    assert_eq!(adopted.status, DOG_STATUS_ADOPTED);
    assert!(adopted.is_adopted());

    let again = services.dogs.mark_as_adopted(rex.id).unwrap();
    assert_eq!(again.status, DOG_STATUS_ADOPTED);
    assert_eq!(again.revision, adopted.revision + 1);

    let loaded = services.dogs.get_by_id(rex.id).unwrap().unwrap();
    assert_eq!(loaded.status, DOG_STATUS_ADOPTED);
}

#[test]
fn mark_as_adopted_of_unknown_dog_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let id = EntityId::new();

    assert!(matches!(
        services.dogs.mark_as_adopted(id),
        Err(ServiceError::NotFound {
            entity: EntityKind::Dog,
            id: missing
        }) if missing == id
    ));
}

#[test]
fn applications_link_dog_and_adopter_both_ways() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let labrador = services.breeds.add(Breed::new("Labrador")).unwrap();
    let rex = services
        .dogs
        .add(Dog::new("Rex", 3, Sex::M, labrador.id))
        .unwrap();
    let ana = services
        .adopters
        .add(Adopter::new("Ana Silva", "ana@example.com"))
        .unwrap();

    let application = services
        .applications
        .add(AdoptionApplication::new(rex.id, ana.id).with_notes("Has a fenced yard"))
        .unwrap();
    assert!(!application.id.is_unset());

    let loaded = services
        .applications
        .get_by_id(application.id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, "Pending");
    assert_eq!(loaded.created_on, application.created_on);
    assert_eq!(loaded.dog.map(|dog| dog.id), Some(rex.id));
    assert_eq!(loaded.adopter.map(|adopter| adopter.id), Some(ana.id));

    let adopter = services.adopters.get_by_id(ana.id).unwrap().unwrap();
    assert_eq!(adopter.applications.len(), 1);
    assert_eq!(adopter.applications[0].id, application.id);
    assert!(adopter.applications[0].dog.is_none());
}

#[test]
fn deleting_an_adopter_removes_their_applications() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let labrador = services.breeds.add(Breed::new("Labrador")).unwrap();
    let rex = services
        .dogs
        .add(Dog::new("Rex", 3, Sex::M, labrador.id))
        .unwrap();
    let ana = services
        .adopters
        .add(Adopter::new("Ana Silva", "ana@example.com"))
        .unwrap();
    let application = services
        .applications
        .add(AdoptionApplication::new(rex.id, ana.id))
        .unwrap();

    services.adopters.delete_by_id(ana.id).unwrap();

    assert!(services
        .applications
        .get_by_id(application.id)
        .unwrap()
        .is_none());
    assert!(services.dogs.get_by_id(rex.id).unwrap().is_some());
}

#[test]
fn update_returns_record_without_stale_relations() {
    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let beagle = services.breeds.add(Breed::new("Beagle")).unwrap();
    let akita = services.breeds.add(Breed::new("Akita")).unwrap();
    let added = services
        .dogs
        .add(Dog::new("Daisy", 1, Sex::F, beagle.id))
        .unwrap();

    let mut daisy = services.dogs.get_by_id(added.id).unwrap().unwrap();
    assert_eq!(daisy.breed.as_ref().map(|breed| breed.id), Some(beagle.id));
    daisy.breed_id = akita.id;

    let stored = services.dogs.update(daisy).unwrap();
    assert_eq!(stored.breed_id, akita.id);
    assert!(stored.breed.is_none());

    let reloaded = services.dogs.get_by_id(added.id).unwrap().unwrap();
    assert_eq!(reloaded.breed.map(|breed| breed.name).as_deref(), Some("Akita"));
}

#[test]
fn get_all_loads_relations_for_large_tables() {
    // More breeds than SQLite accepts as parameters in one statement.
    const BREED_COUNT: usize = 33_000;

    let conn = open_db_in_memory().unwrap();
    let services = services(&conn);
    let breeds = services
        .breeds
        .insert_many(
            (0..BREED_COUNT)
                .map(|index| Breed::new(format!("Breed {index}")))
                .collect(),
        )
        .unwrap();

    let owners = [0, 499, 500, 1_000, BREED_COUNT - 1];
    let dogs = services
        .dogs
        .insert_many(
            owners
                .iter()
                .map(|&index| Dog::new(format!("Dog {index}"), 2, Sex::M, breeds[index].id))
                .collect(),
        )
        .unwrap();

    let loaded = services.breeds.get_all().unwrap();
    assert_eq!(loaded.len(), BREED_COUNT);
    for (dog, &index) in dogs.iter().zip(owners.iter()) {
        assert_eq!(loaded[index].id, breeds[index].id);
        let dog_ids: Vec<EntityId> = loaded[index].dogs.iter().map(|dog| dog.id).collect();
        assert_eq!(dog_ids, vec![dog.id]);
    }
    let with_dogs = loaded.iter().filter(|breed| !breed.dogs.is_empty()).count();
    assert_eq!(with_dogs, owners.len());

    let loaded_dogs = services.dogs.get_all().unwrap();
    assert_eq!(loaded_dogs.len(), owners.len());
    for (dog, &index) in loaded_dogs.iter().zip(owners.iter()) {
        assert_eq!(
            dog.breed.as_ref().map(|breed| breed.name.clone()),
            Some(format!("Breed {index}"))
        );
    }
}
