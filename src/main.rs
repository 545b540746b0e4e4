//! Demo embedding of the shell with a small device-style menu.

use lineshell::shell::command::CommandTable;
use lineshell::shell::{CommandEntry, Shell};
use lineshell::shell_printf;
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

const DEVICES: &[(&str, &str)] = &[
    ("00:1A:7D:DA:71:13", "Keyboard"),
    ("00:1A:7D:DA:71:14", "Headset"),
    ("5C:F3:70:8B:12:01", "Sensor"),
];

fn main() {
    let mut shell = Shell::init(std::env::args_os());

    let menu = match build_menu() {
        Ok(menu) => menu,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = shell.set_menu(menu) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = shell.attach_stdin() {
        eprintln!("error: failed to attach stdin: {e}");
        std::process::exit(1);
    }

    shell.run();
}

fn build_menu() -> Result<CommandTable, lineshell::error::ShellError> {
    let powered = Rc::new(Cell::new(false));

    CommandTable::new()
        .command(
            CommandEntry::new("echo", "Print the given text", |shell, arg| {
                shell.print(format!("{arg}\n"));
            })
            .with_args("<text>"),
        )?
        .command(
            CommandEntry::new("hexdump", "Dump the bytes of the given text", |shell, arg| {
                shell.hexdump(arg.as_bytes());
            })
            .with_args("<text>"),
        )?
        .command(
            CommandEntry::new("prompt", "Change the prompt", |shell, arg| {
                if arg.is_empty() {
                    shell.print("Missing prompt argument\n");
                    return;
                }
                shell.set_prompt(&format!("{arg} "));
            })
            .with_args("<text>"),
        )?
        .command(power_entry(Rc::clone(&powered)))?
        .command(
            CommandEntry::new("pair", "Pair with a device", cmd_pair)
                .with_args("<dev>")
                .with_completion(complete_device)
                .with_display(show_devices),
        )?
        .command(
            CommandEntry::new("info", "Show device information", cmd_info)
                .with_args("[dev]")
                .with_completion(complete_device)
                .with_display(show_devices),
        )
}

fn power_entry(powered: Rc<Cell<bool>>) -> CommandEntry {
    CommandEntry::new("power", "Set controller power", move |shell, arg| {
        match arg {
            "on" => powered.set(true),
            "off" => powered.set(false),
            "" => {}
            other => {
                shell_printf!(shell, "Invalid argument {other}\n");
                return;
            }
        }
        let state = if powered.get() { "on" } else { "off" };
        shell_printf!(shell, "Power {state}\n");
    })
    .with_args("<on/off>")
    .with_completion(|text| {
        ["on", "off"]
            .iter()
            .filter(|value| value.starts_with(text))
            .map(|value| value.to_string())
            .collect()
    })
}

fn cmd_pair(shell: &mut Shell, arg: &str) {
    let Some((address, name)) = find_device(arg) else {
        shell_printf!(shell, "Device {arg} not available\n");
        return;
    };
    let requested = shell.request_input("agent", "Enter PIN code:", move |shell, pin| {
        if pin.is_empty() {
            shell.print("Pairing cancelled\n");
            return;
        }
        let question = format!("Confirm passkey {pin} (yes/no):");
        shell.request_input("agent", &question, move |shell, answer| {
            if answer == "yes" {
                shell_printf!(shell, "Paired with {name} ({address})\n");
            } else {
                shell.print("Pairing rejected\n");
            }
        });
    });
    if !requested {
        shell.print("Another request is pending\n");
    }
}

fn cmd_info(shell: &mut Shell, arg: &str) {
    let devices: Vec<_> = if arg.is_empty() {
        DEVICES.iter().collect()
    } else {
        DEVICES.iter().filter(|(address, _)| *address == arg).collect()
    };
    if devices.is_empty() {
        shell_printf!(shell, "Device {arg} not available\n");
        return;
    }
    for (address, name) in devices {
        shell_printf!(shell, "Device {address}\n\tName: {name}\n");
    }
}

fn find_device(address: &str) -> Option<(&'static str, &'static str)> {
    DEVICES.iter().copied().find(|(candidate, _)| *candidate == address)
}

fn complete_device(text: &str) -> Vec<String> {
    DEVICES
        .iter()
        .filter(|(address, _)| address.starts_with(text))
        .map(|(address, _)| address.to_string())
        .collect()
}

fn show_devices(out: &mut dyn Write, candidates: &[String]) -> std::io::Result<()> {
    for candidate in candidates {
        let name = find_device(candidate).map(|(_, name)| name).unwrap_or("");
        writeln!(out, "{candidate}  {name}")?;
    }
    Ok(())
}
