use codspeed_criterion_compat::{
    Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use mdesk_tokenizer::{TokenKind, Tokenizer};

static SOURCE: &str = "
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
@struct Foo: { a: S32, b: *S32, c: **void, e: (*[100]F32), f: ([4 + 5]S32) } // trailing
@enum Bar: { X = 0x10; Y = 0b0101; Z = 1_000_000; W = 1.5e-2 } /* block */ 'single' \"double\"
";

static LITERALS: &str = r#"
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
'''a triplet literal with ' and '' inside''' """another "one" here""" ```and `ticks` too```
"#;

static IDENTIFIERS: &str =
    "It was the year when they finally immanentized the Eschaton It was the year when they \
     finally immanentized the Eschaton It was the year when they finally immanentized the \
     Eschaton It was the year when they finally immanentized the Eschaton It was the year when \
     they finally immanentized the Eschaton It was the year when they finally immanentized the \
     Eschaton It was the year when they finally immanentized the Eschaton";

static CANDIDATES: [(&str, &str); 3] =
    [("identifiers", IDENTIFIERS), ("literals", LITERALS), ("mixed_syntax", SOURCE)];

fn iterate(s: &str) {
    let mut tokenizer = Tokenizer::new(s.as_bytes());

    loop {
        let token = tokenizer.next_token();
        if token.kind == TokenKind::EOF {
            break;
        }

        black_box(token);
    }
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for (name, source) in CANDIDATES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(name, &source, |b, &s| b.iter(|| iterate(s)));
    }
}

criterion_group!(benches, bench_iterate);
criterion_main!(benches);
