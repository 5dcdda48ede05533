use std::io::{self, Write};

use um::{Machine, Program};

fn main() {
    let path = std::env::args().nth(1).expect("missing program file");
    let bytes = std::fs::read(&path).unwrap();
    let program = Program::from_bytes(&bytes);

    let mut input = io::stdin();
    let mut output = Vec::new();
    let mut machine = Machine::new(program.into_words(), &mut input, &mut output);
    machine.run().unwrap();

    io::stdout().write_all(&output).unwrap();
}
