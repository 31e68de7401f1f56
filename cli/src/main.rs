//! relayerrors CLI — decode relay revert data and classify failures from
//! the terminal.
//!
//! Usage:
//! ```bash
//! # Decode raw hex revert data against the bundled interfaces
//! relayerrors decode --data 0x08c379a0...
//!
//! # Decode function calldata instead of revert data
//! relayerrors decode --data 0xa9059cbb... --call
//!
//! # Classify a failure chain from a JSON file
//! relayerrors classify --file failure.json
//!
//! # Output as JSON
//! relayerrors decode --data 0x08c379a0... --json
//! ```

use std::env;
use std::fs;
use std::process;

use relayerrors_core::RelayFailure;
use relayerrors_evm::{
    bundled_registry, decode_call_hex, decode_error_hex, RelayErrorClassifier,
};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "decode" => cmd_decode(&args[2..]),
        "classify" => cmd_classify(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("relayerrors {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("relayerrors {}", env!("CARGO_PKG_VERSION"));
    println!("Decode relay revert data and classify failures\n");
    println!("USAGE:");
    println!("    relayerrors <COMMAND>\n");
    println!("COMMANDS:");
    println!("    decode    Decode hex revert or call data");
    println!("    classify  Classify a failure chain from JSON");
    println!("    version   Print version");
    println!("    help      Print this help\n");
    println!("DECODE FLAGS:");
    println!("    --data <HEX>    Revert/call data (0x-prefixed hex)  [required]");
    println!("    --call          Treat the data as function calldata");
    println!("    --json          Output as JSON\n");
    println!("CLASSIFY FLAGS:");
    println!("    --file <PATH>   JSON file with the failure to classify  [required]");
    println!("    --json          Output as JSON");
}

fn cmd_decode(args: &[String]) {
    let mut data_hex: Option<&str> = None;
    let mut as_call = false;
    let mut as_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--data" => {
                i += 1;
                data_hex = args.get(i).map(|s| s.as_str());
            }
            "--call" => as_call = true,
            "--json" => as_json = true,
            flag => {
                eprintln!("Unknown flag: {flag}");
                process::exit(1);
            }
        }
        i += 1;
    }

    let hex_str = match data_hex {
        Some(h) => h,
        None => {
            eprintln!("Error: --data is required");
            process::exit(1);
        }
    };

    let registry = bundled_registry();

    if as_call {
        match decode_call_hex(hex_str, &registry) {
            Ok(call) => {
                if as_json {
                    print_json(&call);
                } else {
                    println!("{call}");
                    println!("  Signature: {}", call.signature);
                    println!("  Selector:  0x{}", hex::encode(call.selector));
                }
            }
            Err(e) => {
                eprintln!("Decode error: {e}");
                process::exit(1);
            }
        }
    } else {
        match decode_error_hex(hex_str, &registry) {
            Ok(decoded) => {
                if as_json {
                    print_json(&decoded);
                } else {
                    println!("{decoded}");
                    println!("  Signature: {}", decoded.signature);
                    println!("  Selector:  0x{}", hex::encode(decoded.selector));
                }
            }
            Err(e) => {
                eprintln!("Decode error: {e}");
                process::exit(1);
            }
        }
    }
}

fn cmd_classify(args: &[String]) {
    let mut file: Option<&str> = None;
    let mut as_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--file" => {
                i += 1;
                file = args.get(i).map(|s| s.as_str());
            }
            "--json" => as_json = true,
            flag => {
                eprintln!("Unknown flag: {flag}");
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = match file {
        Some(p) => p,
        None => {
            eprintln!("Error: --file is required");
            process::exit(1);
        }
    };

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Cannot read {path}: {e}");
            process::exit(1);
        }
    };

    let failure: RelayFailure = match serde_json::from_str(&content) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Invalid failure JSON: {e}");
            process::exit(1);
        }
    };

    let classifier = RelayErrorClassifier::with_bundled_interfaces();
    let record = classifier.classify(failure);

    if as_json {
        print_json(&record);
    } else {
        println!("{record}");
        println!("  HTTP status: {}", record.http_status());
        if let Some(details) = &record.details {
            if let Some(decoded) = &details.decoded {
                println!("  Decoded:     {decoded}");
            }
            if let Some(selector) = &details.selector {
                println!("  Selector:    {selector}");
            }
        }
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("JSON serialization error: {e}");
            process::exit(1);
        }
    }
}
