use std::io::{Stdout, Write};

use anyhow::{anyhow, bail, Result};
use crossterm::{self as ct, terminal};
use rustyline::{error::ReadlineError, DefaultEditor};
use stackmachine_lib::core::Program;
use stackmachine_lib::vm::{Stack, Vm};

#[derive(PartialEq, Clone)]
enum UserCommand {
    Next,
    Continue,
    LastCommand,
    ShowStack,
    ShowStackAt(usize),
    ShowLabels,
    Quit,
}

pub fn run(program: &Program, src: &str, stdout: &mut Stdout) -> Result<()> {
    let mut vm = Vm::new();
    let mut rl = DefaultEditor::new()?;
    let mut last_cmd: Option<UserCommand> = None;

    use UserCommand::*;
    loop {
        render_state(stdout, &vm, program, src)?;
        stdout.flush()?;
        if vm.is_finished(program) {
            println!("Program finished, final stack: {}", vm.stack());
        }
        let mut cmd = read_line(&mut rl)?;
        if cmd == UserCommand::LastCommand {
            if let Some(last) = &last_cmd {
                cmd = last.clone();
            }
        }
        match &cmd {
            LastCommand => {
                // This is only reached, if there was no last command, in which case it's
                // a noop
            }
            Next => {
                if vm.is_finished(program) {
                    return Ok(());
                }
                step(&mut vm, program)?;
            }
            Continue => {
                while !vm.is_finished(program) {
                    step(&mut vm, program)?;
                }
            }
            ShowStack => {
                for depth in 0..vm.stack().len() {
                    if let Some(value) = vm.stack().peek(depth) {
                        println!("{}: {}", depth, value);
                    }
                }
            }
            ShowStackAt(depth) => match vm.stack().peek(*depth) {
                Some(value) => println!("{}", value),
                None => println!("Invalid stack depth"),
            },
            ShowLabels => {
                for (name, index) in program.labels.sorted() {
                    println!("{}: {}", name, index);
                }
            }
            Quit => return Ok(()),
        }
        last_cmd = Some(cmd);
    }
}

fn step(vm: &mut Vm, program: &Program) -> Result<()> {
    vm.step(program)
        .map_err(|e| anyhow!(crate::describe_runtime_error(program, &e)))
}

fn read_line(rl: &mut DefaultEditor) -> Result<UserCommand> {
    loop {
        let line = rl.readline("> ");
        use ReadlineError::*;
        match line {
            Ok(line) => match parse_line(&line) {
                Ok(cmd) => return Ok(cmd),
                Err(e) => eprintln!("Error: {}", e),
            },
            Err(Interrupted | Eof) => return Ok(UserCommand::Quit),
            Err(other) => return Err(other.into()),
        }
    }
}

fn parse_line(line: &str) -> Result<UserCommand> {
    use UserCommand::*;
    let elems: Vec<_> = line.split_whitespace().collect();

    match elems.first() {
        None => Ok(LastCommand),
        Some(&("n" | "next")) => Ok(Next),
        Some(&("c" | "continue")) => Ok(Continue),
        Some(&("q" | "quit")) => Ok(Quit),
        Some(&("s" | "show")) => parse_show(&elems[1..]),
        Some(_) => Err(anyhow!("Invalid Command")),
    }
}

fn parse_show(elems: &[&str]) -> Result<UserCommand> {
    match elems {
        [] => Err(anyhow!("show needs an argument")),
        ["s" | "stack"] => Ok(UserCommand::ShowStack),
        ["l" | "labels"] => Ok(UserCommand::ShowLabels),
        ["s" | "stack", "at", depth] => Ok(UserCommand::ShowStackAt(depth.parse()?)),
        [_] => bail!("Invalid word after show"),
        _ => bail!("Invalid Command"),
    }
}

struct Rect {
    w: u16,
    h: u16,
    x: u16,
    y: u16,
}

struct Rects {
    src: Rect,
    code: Rect,
    stack: Rect,
}

impl Rect {
    pub fn render(
        &self,
        stdout: &mut Stdout,
        lines: impl IntoIterator<Item = String>,
    ) -> Result<()> {
        let mut counter = 0;
        let wu = self.w as usize;
        for (i, line) in lines.into_iter().take(self.h.into()).enumerate() {
            ct::queue!(stdout, ct::cursor::MoveTo(self.x, self.y + i as u16))?;
            let line: String = line.chars().take(wu).collect();
            print!("{:width$}", line, width = wu);
            counter += 1;
        }

        while counter < self.h {
            ct::queue!(stdout, ct::cursor::MoveTo(self.x, self.y + counter))?;
            print!("{:width$}", "", width = wu);
            counter += 1;
        }
        Ok(())
    }
}

fn render_state(stdout: &mut Stdout, vm: &Vm, program: &Program, src: &str) -> Result<()> {
    let curr_cursor = ct::cursor::position()?;
    let term_size = terminal::size()?;
    let rects = compute_rects(term_size);
    render_src(stdout, &rects.src, src)?;
    render_code(stdout, &rects.code, program, vm.pc())?;
    render_stack(stdout, &rects.stack, vm.stack())?;
    ct::queue!(stdout, ct::cursor::MoveTo(curr_cursor.0, curr_cursor.1))?;
    Ok(())
}

fn render_src(stdout: &mut Stdout, rect: &Rect, src: &str) -> Result<()> {
    rect.render(stdout, src.lines().map(|x| x.into()))
}

/// the instructions starting at the pc, the first line is the next one to run
fn render_code(stdout: &mut Stdout, rect: &Rect, program: &Program, pc: usize) -> Result<()> {
    let header = if pc < program.len() {
        format!("pc = {}", pc)
    } else {
        "finished".into()
    };
    rect.render(stdout, std::iter::once(header).chain(program.listing(pc)))
}

/// the top of the stack is drawn at the top of the rect
fn render_stack(stdout: &mut Stdout, rect: &Rect, stack: &Stack) -> Result<()> {
    let lines = std::iter::once(format!("Stack ({}):", stack.len())).chain(
        (0..stack.len()).filter_map(|depth| stack.peek(depth).map(|v| format!("{}: {}", depth, v))),
    );
    rect.render(stdout, lines)
}

fn compute_rects((term_w, term_h): (u16, u16)) -> Rects {
    let width12 = term_w / 2;
    let width14 = term_w / 4;
    let width34 = term_w * 3 / 4;
    let height45 = term_h * 4 / 5;

    Rects {
        src: Rect {
            x: 0,
            y: 0,
            w: width12,
            h: height45,
        },
        code: Rect {
            x: width12,
            y: 0,
            w: width14,
            h: height45,
        },
        stack: Rect {
            x: width34,
            y: 0,
            w: term_w - width34,
            h: height45,
        },
    }
}
