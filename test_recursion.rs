const BASE: u64 = 1;

fn fib(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    fib(n - 1) + fib(n - 2)
}

fn fact(n: u64) -> u64 {
    if n == 0 {
        return BASE;
    }
    n * fact(n - 1)
}

fn halve(n: u64) -> u64 {
    n / 2
}

fn collatz(n: u64, steps: u32) -> u32 {
    if n == 1 {
        steps
    } else if n % 2 == 0 {
        collatz(halve(n), steps + 1)
    } else {
        collatz(3 * n + 1, steps + 1)
    }
}

fn main() {
    println!("{}", fib(10));
    println!("{}", fact(5));
    println!("{}", collatz(6, 0));
}
