use std::io::{self, BufRead, Write};

use clap::{App, Arg};

use m6502::bus::Bus;
use m6502::cpu6502::{self, Cpu};
use m6502::harness;

fn main() {
    let matches = App::new("m6502")
        .version("0.1.0")
        .about("MOS 6502 CPU core with a scripted verification harness")
        .arg(
            Arg::with_name("all")
                .short("a")
                .long("all")
                .help("Run every check group and exit"),
        )
        .arg(
            Arg::with_name("group")
                .short("g")
                .long("group")
                .takes_value(true)
                .value_name("NAME")
                .help("Run one check group by name or menu key"),
        )
        .arg(
            Arg::with_name("trace")
                .short("t")
                .long("trace")
                .help("Step a demo program, printing one trace line per instruction"),
        )
        .get_matches();

    if matches.is_present("trace") {
        run_trace_demo();
        return;
    }
    if matches.is_present("all") {
        harness::report_all();
        return;
    }
    if let Some(name) = matches.value_of("group") {
        match find_group(name) {
            Some(group) => {
                harness::report(group);
            }
            None => {
                eprintln!("unknown group '{}'", name);
                list_groups();
            }
        }
        return;
    }

    menu();
}

fn find_group(name: &str) -> Option<&'static harness::Group> {
    harness::GROUPS
        .iter()
        .find(|group| group.name == name || name.chars().next() == Some(group.key))
}

fn list_groups() {
    for group in harness::GROUPS {
        println!("  {}  {}", group.key, group.name);
    }
}

fn menu() {
    let stdin = io::stdin();
    loop {
        println!();
        println!("Select an instruction group to verify:");
        list_groups();
        println!("  a  run all groups");
        println!("  q  quit");
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break; // end of input
        }
        match line.trim().chars().next() {
            Some('q') => break,
            Some('a') => harness::report_all(),
            Some(key) => match harness::GROUPS.iter().find(|group| group.key == key) {
                Some(group) => {
                    harness::report(group);
                }
                None => println!("unrecognized selection '{}'", key),
            },
            None => {}
        }
    }
}

// Steps a small program one instruction at a time. A budget of one cycle
// always runs exactly one instruction, since an instruction completes once
// started.
fn run_trace_demo() {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    cpu.program_counter = 0x0200;
    bus.write_u16(0xFFFE, 0x0200); // BRK wraps the demo back to its start
    bus.load(0x0200, &[0xA9, 0x20, 0x69, 0x22, 0x8D, 0x00, 0x03, 0x00]);

    for _ in 0..8 {
        println!("{}", cpu6502::trace(&cpu, &bus));
        cpu.execute(&mut bus, 1);
    }
}
