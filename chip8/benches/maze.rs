use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chip8::{prelude::*, NullDevices};

/// Random maze generator, endlessly drawing diagonal lines.
#[rustfmt::skip]
const MAZE: &[u8] = &[
    0xA2, 0x1E, // LD I, 0x21E
    0xC2, 0x01, // RND v2, 1
    0x32, 0x01, // SE v2, 1
    0xA2, 0x1A, // LD I, 0x21A
    0xD0, 0x14, // DRW v0, v1, 4
    0x70, 0x04, // ADD v0, 4
    0x30, 0x40, // SE v0, 64
    0x12, 0x00, // JP 0x200
    0x60, 0x00, // LD v0, 0
    0x71, 0x04, // ADD v1, 4
    0x31, 0x20, // SE v1, 32
    0x12, 0x00, // JP 0x200
    0x12, 0x18, // JP 0x218
    0x80, 0x40, 0x20, 0x10, // sprite \
    0x20, 0x40, 0x80, 0x10, // sprite /
];

fn maze_vm() -> Chip8Vm {
    let mut vm = Chip8Vm::new(Chip8Conf {
        seed: Some(0),
        ..Default::default()
    });
    vm.load_bytecode(MAZE).unwrap();
    vm
}

fn criterion_benchmark(c: &mut Criterion) {
    {
        let mut vm = maze_vm();

        c.bench_function("maze steps", |b| {
            b.iter(|| {
                let step_count = black_box(1000_usize);
                black_box(vm.run_steps(step_count))
            })
        });
    }

    {
        let mut vm = maze_vm();
        let mut devices = NullDevices;
        let frame = Duration::from_micros(16_667);

        c.bench_function("maze frame", |b| {
            b.iter(|| black_box(vm.run_frame(&mut devices, black_box(frame))))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
