use crate::combination_generator::SequentialCombinationGenerator;
use crate::config::WheelConfig;
use crate::number_set::{NumberSet, MAX_RANGE, NUMBER_DELIMITER};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

pub mod test_utilities;

/// check a wheel by brute force: walk every ticket of the configuration and make sure some
/// wheel ticket meets it in at least match_size numbers. returns the first ticket that no
/// wheel ticket covers.
pub fn verify_wheel(config: &WheelConfig, wheel: &[NumberSet]) -> Result<(), NumberSet> {
    for ticket in SequentialCombinationGenerator::new(config.range, config.ticket_size) {
        if !wheel
            .iter()
            .any(|selected| selected.overlap(&ticket) >= config.match_size)
        {
            return Err(ticket);
        }
    }
    Ok(())
}

/// write one ticket per line, numbers joined by the number delimiter (e.g. 3;7;12)
pub fn write_wheel_file<P: AsRef<Path>>(path: P, wheel: &[NumberSet]) -> Result<(), String> {
    let file = match File::create(path.as_ref()) {
        Ok(file) => file,
        Err(e) => {
            return Err(format!(
                "could not create wheel file {}: {}",
                path.as_ref().display(),
                e
            ))
        }
    };

    let mut writer = BufWriter::new(file);
    for ticket in wheel {
        writeln!(writer, "{}", ticket).map_err(|e| format!("could not write ticket: {}", e))?;
    }
    writer
        .flush()
        .map_err(|e| format!("could not write wheel file: {}", e))
}

/// read a wheel written by `write_wheel_file`. blank lines are skipped, anything else that
/// isn't a delimited list of numbers in 1..=64 is an error.
pub fn read_wheel_file<P: AsRef<Path>>(path: P) -> Result<Vec<NumberSet>, String> {
    let ticket_line_regex = match Regex::new(&format!(r"^\d+(?:{}\d+)*$", NUMBER_DELIMITER)) {
        Ok(regex) => regex,
        Err(e) => panic!("failed to create ticket line regex due to error: {e}"),
    };

    let file = match File::open(path.as_ref()) {
        Ok(file) => file,
        Err(e) => {
            return Err(format!(
                "could not open wheel file {}: {}",
                path.as_ref().display(),
                e
            ))
        }
    };

    let mut wheel = Vec::new();
    for (line_index, line) in io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| format!("could not read line {}: {}", line_index + 1, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !ticket_line_regex.is_match(line) {
            return Err(format!(
                "line {} is not a ticket: \"{}\"",
                line_index + 1,
                line
            ));
        }

        let mut numbers = Vec::new();
        for number in line.split(NUMBER_DELIMITER) {
            match number.parse::<u8>() {
                Ok(number) if number != 0 && number as usize <= MAX_RANGE => numbers.push(number),
                _ => {
                    return Err(format!(
                        "line {} contains {} which is outside of [1, {}]",
                        line_index + 1,
                        number,
                        MAX_RANGE
                    ))
                }
            }
        }
        wheel.push(NumberSet::from_numbers(&numbers));
    }

    Ok(wheel)
}
