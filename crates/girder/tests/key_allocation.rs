//! Property tests for atomic ticket-key allocation.
//!
//! The allocator lives under the storage lock, so any interleaving of
//! creates must yield dense, pairwise-distinct keys per project.

use girder::domain::{IssuePriority, IssueType, NewProject, NewTicket, NewUser};
use girder::storage::{create_storage, StorageBackend};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For any interleaving of creates across projects, every project's
    /// keys are pairwise distinct and each suffix equals the ticket's
    /// count.
    #[test]
    fn prop_keys_pairwise_distinct(ops in proptest::collection::vec(0usize..3, 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async move {
            let mut storage = create_storage(StorageBackend::InMemory).await.unwrap();

            let user = storage
                .create_user(NewUser {
                    name: "alice".to_string(),
                    picture_url: String::new(),
                })
                .await
                .unwrap();

            let mut projects = Vec::new();
            for key in ["ALPHA", "BETA", "GAMMA"] {
                projects.push(
                    storage
                        .create_project(NewProject {
                            name: key.to_string(),
                            key: key.to_string(),
                        })
                        .await
                        .unwrap(),
                );
            }

            for (i, &target) in ops.iter().enumerate() {
                let project = &projects[target];
                let ticket = storage
                    .create_ticket(NewTicket {
                        project_id: project.id.clone(),
                        issue_type: IssueType::Task,
                        issue_priority: IssuePriority::Medium,
                        summary: format!("Ticket {i}"),
                        description: String::new(),
                        assignee_id: None,
                        reporter_id: user.id.clone(),
                        epic: None,
                    })
                    .await
                    .unwrap();

                let expected_prefix = format!("{}-", project.key);
                prop_assert!(ticket.key.as_str().starts_with(&expected_prefix));
                prop_assert_eq!(ticket.key.count().unwrap(), ticket.count);
            }

            for project in &projects {
                let tickets = storage.list_tickets(&project.id).await.unwrap();
                let keys: HashSet<&str> =
                    tickets.iter().map(|t| t.key.as_str()).collect();
                prop_assert_eq!(keys.len(), tickets.len());

                // Counts are dense: 1..=n.
                let mut counts: Vec<u64> = tickets.iter().map(|t| t.count).collect();
                counts.sort_unstable();
                let expected: Vec<u64> = (1..=tickets.len() as u64).collect();
                prop_assert_eq!(counts, expected);
            }

            Ok(())
        })?;
    }
}
