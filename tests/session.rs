use std::io::Cursor;

use blockfit::config::Config;
use blockfit::core::allocator::{FitStrategy, MemoryBlock};
use blockfit::palette::{ALLOCATED_COLOR, FREE_COLOR, OWNER_COLORS};
use blockfit::session::Session;

fn run(memory_size: u64, script: &str) -> (Session, String) {
    let mut session = Session::new(&Config {
        memory_size,
        strategy: FitStrategy::FirstFit,
    })
    .unwrap();

    let mut output = Vec::new();
    session.run(Cursor::new(script), &mut output).unwrap();
    (session, String::from_utf8(output).unwrap())
}

#[test]
fn scripted_allocations_and_coalescing() {
    let (session, output) = run(
        10,
        "\
alloc 3 p1
alloc 3 p2
alloc 2
free 0
free 3
",
    );

    assert_eq!(
        session.ledger().blocks(),
        &[
            MemoryBlock::free(0, 6),
            MemoryBlock {
                start_address: 6,
                size: 2,
                allocated: true,
                owner: None,
            },
            MemoryBlock::free(8, 2),
        ]
    );
    assert!(output.contains("Allocated 3 at address 0 (First-Fit)."));
    assert!(output.contains("Allocated 2 at address 6 (First-Fit)."));
    assert!(output.contains("Deallocated block at address 3."));
}

#[test]
fn errors_are_reported_and_the_session_goes_on() {
    let (session, output) = run(
        10,
        "\
alloc ten
alloc 11
free 4
free x
strategy buddy
launch
alloc 10
",
    );

    let errors: Vec<_> = output
        .lines()
        .filter(|line| line.starts_with("error: "))
        .collect();
    assert_eq!(errors.len(), 6);
    assert!(errors[0].contains("Invalid size `ten`"));
    assert!(errors[1].contains("Out of memory"));
    assert!(errors[2].contains("No allocated block found at address 4"));
    assert!(errors[3].contains("Invalid address `x`"));
    assert!(errors[4].contains("Unknown strategy `buddy`"));
    assert!(errors[5].contains("Unknown command `launch`"));

    assert_eq!(session.ledger().total_allocated(), 10);
}

#[test]
fn strategy_switch_applies_to_later_allocations() {
    let (session, output) = run(
        17,
        "\
alloc 5
alloc 1
alloc 2
alloc 1
alloc 8
free 0
free 6
free 9
strategy best
alloc 2
strategy worst-fit
alloc 2
",
    );

    assert!(output.contains("Current: Best-Fit"));
    assert!(output.contains("Allocated 2 at address 6 (Best-Fit)."));
    assert!(output.contains("Allocated 2 at address 9 (Worst-Fit)."));
    assert_eq!(session.strategy(), FitStrategy::WorstFit);
}

#[test]
fn map_and_stats_describe_the_ledger() {
    let (_, output) = run(
        10,
        "\
alloc 4 p1
alloc 2 p2
free 0
map
stats
",
    );

    assert!(output.contains("Address\tSize\tStatus\t\tOwner\tColour"));
    assert!(output.contains(&format!("0\t4\tFree\t\t-\t{FREE_COLOR}")));
    assert!(output.contains(&format!("4\t2\tAllocated\tp2\t{}", OWNER_COLORS[1])));
    assert!(output.contains(&format!("6\t4\tFree\t\t-\t{FREE_COLOR}")));
    assert!(output.contains("Isolated free blocks at: 0, 6"));
    assert!(output.contains(&format!("Owner p1: {}", OWNER_COLORS[0])));
    assert!(output.contains(&format!("Owner p2: {}", OWNER_COLORS[1])));
    assert!(output.contains("Free Blocks: 2"));
    assert!(output.contains("Free Memory: 8"));
    assert!(output.contains("Allocated Memory: 2"));
    assert!(output.contains("Internal Fragmentation: 0"));
}

#[test]
fn quit_stops_reading() {
    let (session, _) = run(
        10,
        "\
# comment lines and blank lines are skipped

alloc 2
quit
alloc 2
",
    );
    assert_eq!(session.ledger().total_allocated(), 2);
}

#[test]
fn reset_clears_blocks_and_owners() {
    let (session, output) = run(
        10,
        "\
alloc 4 p1
strategy next-fit
alloc 1
reset
map
",
    );

    assert_eq!(session.ledger().blocks(), &[MemoryBlock::free(0, 10)]);
    assert_eq!(session.ledger().next_fit_cursor(), 0);
    assert!(session.palette().legend().is_empty());
    assert!(output.contains("Memory reset: one free block of 10."));
    assert!(!output.contains("Owner p1"));
}

#[test]
fn map_colours_unowned_blocks_with_the_default() {
    let (_, output) = run(
        10,
        "\
alloc 3
alloc 2 p1
map
",
    );

    assert!(output.contains(&format!("0\t3\tAllocated\t-\t{ALLOCATED_COLOR}")));
    assert!(output.contains(&format!("3\t2\tAllocated\tp1\t{}", OWNER_COLORS[0])));
    assert!(output.contains(&format!("5\t5\tFree\t\t-\t{FREE_COLOR}")));
}
