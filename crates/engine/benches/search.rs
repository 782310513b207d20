use blocks_core::{Field, PieceCatalog, PieceType};
use blocks_engine::perft::perft;
use blocks_engine::{MovingPiece, ValidMovesSearch};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn stacked_field() -> Field {
    Field::from_rows(&[
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "..........",
        "......b...",
        ".aa...b...",
        ".a....bb..",
        "cccc....dd",
        "c..e.....d",
        "...eee...d",
    ])
}

fn bench_find_valid_moves(c: &mut Criterion) {
    let catalog = PieceCatalog::standard();
    let empty = Field::new(10, 20);
    let stacked = stacked_field();
    let mut search = ValidMovesSearch::for_field(&empty);

    for piece in catalog.iter() {
        c.bench_function(&format!("find_valid_moves_{}", piece.name()), |b| {
            b.iter(|| {
                let spawn = MovingPiece::spawn(piece, &empty);
                search.find_valid_moves(black_box(&empty), spawn, None).len()
            })
        });
        c.bench_function(&format!("find_valid_moves_stacked_{}", piece.name()), |b| {
            b.iter(|| {
                let spawn = MovingPiece::spawn(piece, &stacked);
                search.find_valid_moves(black_box(&stacked), spawn, None).len()
            })
        });
    }
}

fn bench_perft(c: &mut Criterion) {
    let catalog = PieceCatalog::standard();
    let field = Field::new(10, 20);
    let queue: Vec<&PieceType> = ["I", "O", "L"]
        .iter()
        .filter_map(|name| catalog.get(name))
        .collect();

    c.bench_function("perft_depth_1", |b| {
        b.iter(|| perft(black_box(&field), black_box(&queue[..1]), 1))
    });

    c.bench_function("perft_depth_2", |b| {
        b.iter(|| perft(black_box(&field), black_box(&queue[..2]), 2))
    });
}

criterion_group!(benches, bench_find_valid_moves, bench_perft);
criterion_main!(benches);
