use std::sync::Once;

use orderdesk_core::{
    CoordinatorSettings, Cursor, ErrorOutcome, Mutation, OrderRecord, OutboundMessage, PageOutcome,
    PushOutcome, RequestCoordinator, Site, Tab, Ticket,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(desk_logging::initialize_for_tests);
}

fn order(id: &str, site: Site) -> OrderRecord {
    OrderRecord::new(id, Some(site))
}

fn coordinator(tab: Tab) -> RequestCoordinator {
    RequestCoordinator::new(CoordinatorSettings::default(), tab)
}

fn ticket_of(message: &OutboundMessage) -> Ticket {
    message.ticket()
}

#[test]
fn reply_for_previous_tab_is_discarded() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    let t1 = ticket_of(&c.request_page().unwrap());

    let t2 = ticket_of(&c.on_tab_changed(Tab::SiteB).expect("new request after tab change"));
    assert_ne!(t1, t2);
    assert!(c.rows().is_empty());

    let late = c.on_result_received(
        Some(t1),
        vec![order("1", Site::SiteA), order("2", Site::SiteA), order("3", Site::SiteA)],
        Some(Cursor::Offset(50)),
        Some(true),
    );
    assert_eq!(late, PageOutcome::Stale);
    assert!(c.rows().is_empty());
    assert!(c.is_loading());

    c.on_result_received(Some(t2), vec![order("9", Site::SiteB)], None, Some(false));
    assert_eq!(c.rows().len(), 1);
    assert_eq!(c.rows()[0].id, "9");
}

#[test]
fn only_the_latest_of_many_filter_changes_is_applied() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    let mut tickets = vec![ticket_of(&c.request_page().unwrap())];
    tickets.push(ticket_of(&c.on_search_input_changed("a").unwrap()));
    tickets.push(ticket_of(&c.on_tab_changed(Tab::Admin).unwrap()));
    tickets.push(ticket_of(&c.on_search_input_changed("ab").unwrap()));
    tickets.push(ticket_of(&c.on_tab_changed(Tab::SiteB).unwrap()));
    let latest = *tickets.last().unwrap();

    // Deliver in reverse: the latest first, then every older reply.
    for (index, ticket) in tickets.iter().rev().enumerate() {
        let id = format!("reply-{index}");
        let outcome = c.on_result_received(
            Some(*ticket),
            vec![order(&id, Site::SiteB)],
            None,
            Some(false),
        );
        if *ticket == latest {
            assert_eq!(outcome, PageOutcome::Applied { appended: 1 });
        } else {
            assert_eq!(outcome, PageOutcome::Stale);
        }
    }

    assert_eq!(c.rows().len(), 1);
    assert_eq!(c.rows()[0].id, "reply-0");
}

#[test]
fn stale_error_does_not_touch_state() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    let t1 = ticket_of(&c.request_page().unwrap());
    c.on_tab_changed(Tab::SiteB).unwrap();

    assert_eq!(c.on_error_received(Some(t1), "boom".into()), ErrorOutcome::Stale);
    assert!(c.is_loading());
}

/// Page 1 applied with more available, page 2 in flight.
fn loading_second_page() -> (RequestCoordinator, Ticket, Ticket) {
    let mut c = coordinator(Tab::SiteA);
    let t1 = ticket_of(&c.request_page().unwrap());
    c.on_result_received(Some(t1), vec![order("1", Site::SiteA)], Some(Cursor::Offset(1)), Some(true));
    let t2 = ticket_of(&c.on_scroll_near_threshold().unwrap());
    (c, t1, t2)
}

#[test]
fn mutation_error_during_page_load_keeps_loading() {
    init_logging();
    let (mut c, _, t2) = loading_second_page();
    let mutation = c
        .on_mutation_requested(Mutation::Urgency {
            id: "1".into(),
            value: orderdesk_core::Urgency::High,
        })
        .unwrap();
    let mutation_ticket = ticket_of(&mutation);
    assert_ne!(mutation_ticket, t2);
    assert_eq!(mutation_ticket.generation, t2.generation);
    assert_eq!(c.current_ticket(), t2);
    assert_eq!(c.outstanding_mutations(), 1);

    assert_eq!(
        c.on_error_received(Some(mutation_ticket), "locked".into()),
        ErrorOutcome::MutationFailed("locked".into())
    );
    assert!(c.is_loading());
    assert_eq!(c.outstanding_mutations(), 0);

    let applied = c.on_result_received(Some(t2), vec![order("2", Site::SiteA)], None, Some(false));
    assert_eq!(applied, PageOutcome::Applied { appended: 1 });
    assert_eq!(c.rows().len(), 2);
}

#[test]
fn earlier_page_error_under_same_filter_is_stale() {
    init_logging();
    let (mut c, t1, _) = loading_second_page();

    assert_eq!(c.on_error_received(Some(t1), "timeout".into()), ErrorOutcome::Stale);
    assert!(c.is_loading());
}

#[test]
fn mutation_error_is_routed_only_once() {
    init_logging();
    let (mut c, _, _) = loading_second_page();
    let mutation_ticket = ticket_of(
        &c.on_mutation_requested(Mutation::Urgency {
            id: "1".into(),
            value: orderdesk_core::Urgency::Low,
        })
        .unwrap(),
    );

    c.on_error_received(Some(mutation_ticket), "first".into());
    assert_eq!(
        c.on_error_received(Some(mutation_ticket), "again".into()),
        ErrorOutcome::Stale
    );
}

#[test]
fn reset_forgets_outstanding_mutations() {
    init_logging();
    let (mut c, _, _) = loading_second_page();
    c.on_mutation_requested(Mutation::Urgency {
        id: "1".into(),
        value: orderdesk_core::Urgency::Normal,
    })
    .unwrap();
    assert_eq!(c.outstanding_mutations(), 1);

    c.on_tab_changed(Tab::SiteB).unwrap();
    assert_eq!(c.outstanding_mutations(), 0);
}

#[test]
fn error_without_ticket_is_dropped_by_default() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    c.request_page().unwrap();
    assert_eq!(c.on_error_received(None, "boom".into()), ErrorOutcome::Stale);
    assert!(c.is_loading());
}

#[test]
fn transfer_out_of_active_tab_removes_the_row() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    let t1 = ticket_of(&c.request_page().unwrap());
    c.on_result_received(
        Some(t1),
        vec![order("41", Site::SiteA), order("42", Site::SiteA)],
        None,
        Some(false),
    );

    let message = c
        .on_mutation_requested(Mutation::Transfer {
            id: "42".into(),
            to_site: Site::SiteB,
            note: String::new(),
        })
        .unwrap();
    let mutation_ticket = ticket_of(&message);
    assert_eq!(
        message,
        OutboundMessage::TransferOrder {
            id: "42".into(),
            to_site: Site::SiteB,
            note: String::new(),
            ticket: mutation_ticket,
        }
    );
    assert!(!c.is_loading());

    let outcome = c.on_push_update(Some(mutation_ticket), order("42", Site::SiteB));
    assert_eq!(outcome, PushOutcome::Removed);
    let ids: Vec<_> = c.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["41"]);
}

#[test]
fn push_update_within_tab_replaces_in_place() {
    init_logging();
    let mut c = coordinator(Tab::Admin);
    let t1 = ticket_of(&c.request_page().unwrap());
    c.on_result_received(
        Some(t1),
        vec![order("1", Site::SiteA), order("2", Site::SiteB)],
        None,
        Some(false),
    );

    let updated = order("1", Site::SiteB).with_field("urgency", "HIGH");
    assert_eq!(c.on_push_update(Some(t1), updated), PushOutcome::Replaced);
    assert_eq!(c.rows()[0].id, "1");
    assert_eq!(c.rows()[0].urgency(), "HIGH");
    assert_eq!(c.rows()[0].handling_site, Some(Site::SiteB));
}

#[test]
fn push_update_survives_later_page_requests_under_same_filter() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    let t1 = ticket_of(&c.request_page().unwrap());
    c.on_result_received(Some(t1), vec![order("1", Site::SiteA)], Some(Cursor::Offset(1)), Some(true));

    let mutation_ticket = ticket_of(
        &c.on_mutation_requested(Mutation::Transfer {
            id: "1".into(),
            to_site: Site::SiteB,
            note: "fridge".into(),
        })
        .unwrap(),
    );
    c.on_scroll_near_threshold().unwrap();

    assert_eq!(
        c.on_push_update(Some(mutation_ticket), order("1", Site::SiteB)),
        PushOutcome::Removed
    );
}

#[test]
fn push_update_after_filter_change_is_stale() {
    init_logging();
    let mut c = coordinator(Tab::Admin);
    let t1 = ticket_of(&c.request_page().unwrap());
    c.on_result_received(Some(t1), vec![order("1", Site::SiteA)], None, Some(false));
    let mutation_ticket = c.current_ticket();

    c.on_search_input_changed("x").unwrap();
    assert_eq!(
        c.on_push_update(Some(mutation_ticket), order("1", Site::SiteB)),
        PushOutcome::Stale
    );
}

#[test]
fn mutations_need_a_displayed_row() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    let rejected = c.on_mutation_requested(Mutation::Transfer {
        id: "404".into(),
        to_site: Site::SiteB,
        note: String::new(),
    });
    assert_eq!(
        rejected,
        Err(orderdesk_core::MutationRejected::UnknownOrder("404".into()))
    );
}

#[test]
fn transfer_to_current_site_is_rejected() {
    init_logging();
    let mut c = coordinator(Tab::SiteA);
    let t1 = ticket_of(&c.request_page().unwrap());
    c.on_result_received(Some(t1), vec![order("7", Site::SiteA)], None, Some(false));

    let rejected = c.on_mutation_requested(Mutation::Transfer {
        id: "7".into(),
        to_site: Site::SiteA,
        note: String::new(),
    });
    assert!(matches!(
        rejected,
        Err(orderdesk_core::MutationRejected::SameSite { .. })
    ));
}
