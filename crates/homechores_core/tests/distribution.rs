use chrono::{NaiveDate, NaiveTime};
use homechores_core::db::open_db_in_memory;
use homechores_core::repo::availability_repo::SqliteAvailabilityRepository;
use homechores_core::repo::family_repo::SqliteFamilyRepository;
use homechores_core::repo::member_repo::SqliteMemberRepository;
use homechores_core::repo::task_repo::{InstanceListQuery, SqliteTaskRepository};
use homechores_core::{
    AvailabilityService, DistributionError, DistributionOutcome, DistributionService, FailureReason,
    FamilyId, FamilyService, Member, MemberId, MemberService, NewTemplate, TaskId, TaskInstance,
    TaskService, TaskStatus, TaskTemplate, Weekday, WeekdaySet,
};
use rusqlite::Connection;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn register(conn: &Connection, username: &str, birth: Option<(i32, u32, u32)>) -> Member {
    let birth = birth.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
    MemberService::new(SqliteMemberRepository::try_new(conn).unwrap())
        .register_member(username, birth)
        .unwrap()
}

fn families(
    conn: &Connection,
) -> FamilyService<SqliteFamilyRepository<'_>, SqliteMemberRepository<'_>> {
    FamilyService::new(
        SqliteFamilyRepository::try_new(conn).unwrap(),
        SqliteMemberRepository::try_new(conn).unwrap(),
    )
}

fn tasks(conn: &Connection) -> TaskService<SqliteFamilyRepository<'_>, SqliteTaskRepository<'_>> {
    TaskService::new(
        SqliteFamilyRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

fn add_block(conn: &Connection, member: MemberId, day: Weekday, start: NaiveTime, end: NaiveTime) {
    AvailabilityService::new(SqliteAvailabilityRepository::try_new(conn).unwrap())
        .add_block(member, day, start, end)
        .unwrap();
}

fn add_template(
    conn: &Connection,
    family: FamilyId,
    owner: MemberId,
    name: &str,
    minutes: u32,
    min_age: Option<u32>,
    days: &str,
) -> TaskTemplate {
    tasks(conn)
        .create_template(
            owner,
            NewTemplate {
                family_uuid: family,
                name: name.to_string(),
                required_minutes: minutes,
                min_age,
                weekdays: WeekdaySet::parse_delimited(days).unwrap(),
            },
        )
        .unwrap()
}

fn instances(conn: &Connection, family: FamilyId) -> Vec<TaskInstance> {
    tasks(conn)
        .list_instances(&InstanceListQuery::for_family(family))
        .unwrap()
}

fn template_status(conn: &Connection, family: FamilyId, template: TaskId) -> TaskStatus {
    tasks(conn)
        .list_templates(family)
        .unwrap()
        .into_iter()
        .find(|candidate| candidate.uuid == template)
        .unwrap()
        .status
}

/// Owner `ana` (adult) plus member `ben` (adult), in that join order.
fn household(conn: &Connection) -> (FamilyId, Member, Member) {
    let ana = register(conn, "ana", Some((1985, 6, 1)));
    let ben = register(conn, "ben", Some((1990, 2, 1)));
    let service = families(conn);
    let family = service.create_family(ana.uuid, "Smith").unwrap();
    service.join_family(family.uuid, ben.uuid).unwrap();
    (family.uuid, ana, ben)
}

#[test]
fn unavailable_day_is_reported_while_available_day_is_assigned() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, _ben) = household(&conn);
    add_block(&conn, ana.uuid, Weekday::Monday, time(8, 0), time(9, 0));
    let dishes = add_template(&conn, family, ana.uuid, "Dishes", 30, None, "MON,WED");

    let report = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();

    assert_eq!(report.outcome, DistributionOutcome::Completed);
    assert_eq!(report.templates_processed, 1);
    assert_eq!(report.assigned_count(), 1);
    assert_eq!(report.assigned[0].name, "Dishes (MON)");
    assert_eq!(report.assigned[0].assignee_uuid, ana.uuid);
    assert_eq!(report.assigned[0].capacity, 60);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].weekday, Weekday::Wednesday);
    assert_eq!(report.failures[0].reason, FailureReason::NoMemberAvailable);
    assert_eq!(
        report.failure_messages(),
        vec!["Dishes (WED): no eligible member has 30 free minutes that day"]
    );

    let stored = instances(&conn, family);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].weekday, Weekday::Monday);
    assert_eq!(stored[0].template_uuid, Some(dishes.uuid));
    assert_eq!(stored[0].status, TaskStatus::Pending);
    assert_eq!(template_status(&conn, family, dishes.uuid), TaskStatus::Done);
}

#[test]
fn load_from_earlier_assignments_in_the_same_run_spreads_work() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, ben) = household(&conn);
    add_block(&conn, ana.uuid, Weekday::Monday, time(8, 0), time(9, 0));
    add_block(&conn, ben.uuid, Weekday::Monday, time(8, 0), time(10, 0));
    add_template(&conn, family, ana.uuid, "Dishes", 30, None, "MON");
    add_template(&conn, family, ana.uuid, "Laundry", 30, None, "MON");

    let report = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();

    // Equal load: more capacity wins. Then lower load beats capacity.
    let winners: Vec<(String, MemberId, u32)> = report
        .assigned
        .iter()
        .map(|assigned| (assigned.name.clone(), assigned.assignee_uuid, assigned.load_before))
        .collect();
    assert_eq!(
        winners,
        vec![
            ("Dishes (MON)".to_string(), ben.uuid, 0),
            ("Laundry (MON)".to_string(), ana.uuid, 0),
        ]
    );
}

#[test]
fn full_ties_go_to_the_earlier_joined_member() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, ben) = household(&conn);
    add_block(&conn, ben.uuid, Weekday::Tuesday, time(17, 0), time(18, 0));
    add_block(&conn, ana.uuid, Weekday::Tuesday, time(17, 0), time(18, 0));
    add_template(&conn, family, ana.uuid, "Trash", 10, None, "TUE");

    let report = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();

    assert_eq!(report.assigned.len(), 1);
    assert_eq!(report.assigned[0].assignee_uuid, ana.uuid);
}

#[test]
fn done_instances_do_not_count_as_load() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, ben) = household(&conn);
    add_block(&conn, ana.uuid, Weekday::Monday, time(8, 0), time(10, 0));
    add_block(&conn, ben.uuid, Weekday::Monday, time(8, 0), time(9, 0));
    add_template(&conn, family, ana.uuid, "Dishes", 30, None, "MON");

    let first = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();
    assert_eq!(first.assigned[0].assignee_uuid, ana.uuid);
    tasks(&conn)
        .toggle_status(ana.uuid, first.assigned[0].task_uuid)
        .unwrap();

    add_template(&conn, family, ana.uuid, "Laundry", 30, None, "MON");
    let second = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();

    assert_eq!(second.templates_processed, 1);
    assert_eq!(second.assigned[0].name, "Laundry (MON)");
    assert_eq!(second.assigned[0].assignee_uuid, ana.uuid);
    assert_eq!(second.assigned[0].load_before, 0);
}

#[test]
fn minimum_age_filters_candidates_and_names_the_cause() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, _ben) = household(&conn);
    let kid = register(&conn, "kid", Some((2016, 3, 2)));
    families(&conn).join_family(family, kid.uuid).unwrap();
    add_block(&conn, kid.uuid, Weekday::Saturday, time(9, 0), time(12, 0));

    // Kid turns 9 on 2025-03-02; on 2025-03-01 they are 8.
    add_template(&conn, family, ana.uuid, "Feed fish", 5, Some(9), "SAT");
    add_template(&conn, family, ana.uuid, "Mow lawn", 60, Some(99), "SAT");

    let report = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();

    assert!(report.assigned.is_empty());
    let reasons: Vec<FailureReason> = report.failures.iter().map(|failure| failure.reason).collect();
    assert_eq!(
        reasons,
        vec![FailureReason::NoMemberAvailable, FailureReason::NoMemberOldEnough]
    );
    assert_eq!(
        report.failures[1].to_string(),
        "Mow lawn (SAT): no member is at least 99 years old"
    );
}

#[test]
fn minimum_age_is_met_on_the_birthday() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, _ben) = household(&conn);
    let kid = register(&conn, "kid", Some((2016, 3, 1)));
    families(&conn).join_family(family, kid.uuid).unwrap();
    add_block(&conn, kid.uuid, Weekday::Saturday, time(9, 0), time(12, 0));
    add_template(&conn, family, ana.uuid, "Feed fish", 5, Some(9), "SAT");

    let report = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();

    assert_eq!(report.assigned.len(), 1);
    assert_eq!(report.assigned[0].assignee_uuid, kid.uuid);
}

#[test]
fn template_without_weekdays_is_processed_without_instances() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, _ben) = household(&conn);
    add_block(&conn, ana.uuid, Weekday::Monday, time(8, 0), time(9, 0));
    let idle = add_template(&conn, family, ana.uuid, "Someday", 15, None, "");

    let report = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();

    assert_eq!(report.outcome, DistributionOutcome::Completed);
    assert_eq!(report.templates_processed, 1);
    assert!(report.assigned.is_empty());
    assert!(report.failures.is_empty());
    assert!(instances(&conn, family).is_empty());
    assert_eq!(template_status(&conn, family, idle.uuid), TaskStatus::Done);
}

#[test]
fn family_without_pending_templates_has_nothing_to_distribute() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, _ben) = household(&conn);
    add_template(&conn, family, ana.uuid, "Dishes", 30, None, "MON");

    let mut service = DistributionService::with_today(&mut conn, today());
    service.distribute(family, ana.uuid).unwrap();
    let again = service.distribute(family, ana.uuid).unwrap();

    assert_eq!(again.outcome, DistributionOutcome::NothingToDistribute);
    assert_eq!(again.templates_processed, 0);
    assert!(again.assigned.is_empty());
    assert!(again.failures.is_empty());
}

#[test]
fn family_without_members_fails_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    let ana = register(&conn, "ana", None);
    let family = families(&conn).create_family(ana.uuid, "Solo").unwrap();
    let template = add_template(&conn, family.uuid, ana.uuid, "Dishes", 30, None, "MON");
    families(&conn)
        .remove_member(ana.uuid, family.uuid, ana.uuid)
        .unwrap();

    let err = DistributionService::with_today(&mut conn, today())
        .distribute(family.uuid, ana.uuid)
        .unwrap_err();

    assert!(matches!(err, DistributionError::NoMembers(id) if id == family.uuid));
    assert_eq!(
        template_status(&conn, family.uuid, template.uuid),
        TaskStatus::Pending
    );
}

#[test]
fn non_owner_cannot_distribute() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, ben) = household(&conn);
    add_block(&conn, ana.uuid, Weekday::Monday, time(8, 0), time(9, 0));
    let dishes = add_template(&conn, family, ana.uuid, "Dishes", 30, None, "MON");

    let err = DistributionService::with_today(&mut conn, today())
        .distribute(family, ben.uuid)
        .unwrap_err();

    assert!(matches!(
        err,
        DistributionError::Unauthorized { family: f, actor } if f == family && actor == ben.uuid
    ));
    assert!(instances(&conn, family).is_empty());
    assert_eq!(template_status(&conn, family, dishes.uuid), TaskStatus::Pending);
}

#[test]
fn unknown_family_is_reported() {
    let mut conn = open_db_in_memory().unwrap();
    let ana = register(&conn, "ana", None);
    let missing = uuid::Uuid::new_v4();

    let err = DistributionService::with_today(&mut conn, today())
        .distribute(missing, ana.uuid)
        .unwrap_err();
    assert!(matches!(err, DistributionError::FamilyNotFound(id) if id == missing));
}

#[test]
fn store_failure_mid_run_rolls_back_every_write() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, _ben) = household(&conn);
    add_block(&conn, ana.uuid, Weekday::Monday, time(8, 0), time(9, 0));
    add_block(&conn, ana.uuid, Weekday::Wednesday, time(8, 0), time(9, 0));
    let dishes = add_template(&conn, family, ana.uuid, "Dishes", 30, None, "MON,WED");
    conn.execute_batch(
        "CREATE TRIGGER fail_wednesday_insert
         BEFORE INSERT ON tasks
         WHEN NEW.kind = 'instance' AND NEW.name LIKE '%(WED)'
         BEGIN
             SELECT RAISE(ABORT, 'simulated store failure');
         END;",
    )
    .unwrap();

    let err = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap_err();

    assert!(matches!(err, DistributionError::Repo(_)));
    assert!(instances(&conn, family).is_empty());
    assert_eq!(template_status(&conn, family, dishes.uuid), TaskStatus::Pending);
    assert!(conn.is_autocommit());
}

#[test]
fn identical_households_produce_identical_assignments() {
    fn run_once() -> Vec<(String, String)> {
        let mut conn = open_db_in_memory().unwrap();
        let (family, ana, ben) = household(&conn);
        for member in [ana.uuid, ben.uuid] {
            for day in [Weekday::Monday, Weekday::Thursday, Weekday::Sunday] {
                add_block(&conn, member, day, time(18, 0), time(19, 0));
            }
        }
        add_template(&conn, family, ana.uuid, "Dishes", 20, None, "MON,THU,SUN");
        add_template(&conn, family, ana.uuid, "Trash", 10, None, "MON,SUN");
        add_template(&conn, family, ana.uuid, "Vacuum", 40, None, "THU");

        let report = DistributionService::with_today(&mut conn, today())
            .distribute(family, ana.uuid)
            .unwrap();
        let username = |id: MemberId| {
            if id == ana.uuid {
                "ana".to_string()
            } else {
                "ben".to_string()
            }
        };
        report
            .assigned
            .iter()
            .map(|assigned| (assigned.name.clone(), username(assigned.assignee_uuid)))
            .collect()
    }

    let first = run_once();
    assert_eq!(first.len(), 6);
    assert_eq!(first, run_once());
    assert_eq!(first[0], ("Dishes (MON)".to_string(), "ana".to_string()));
    assert_eq!(first[1], ("Dishes (THU)".to_string(), "ben".to_string()));
}

#[test]
fn report_serializes_with_weekday_codes() {
    let mut conn = open_db_in_memory().unwrap();
    let (family, ana, _ben) = household(&conn);
    add_template(&conn, family, ana.uuid, "Dishes", 30, None, "WED");

    let report = DistributionService::with_today(&mut conn, today())
        .distribute(family, ana.uuid)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["failures"][0]["weekday"], "WED");
    assert_eq!(json["failures"][0]["reason"], "no_member_available");
}
